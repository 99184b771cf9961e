use botica_core::models::evaluation::EvaluationSnapshot;
use botica_core::models::patient::{IdentificationType, Patient};
use botica_core::models::response::{MedicalResponse, Recommendation};
use botica_core::models::stored::StoredRecommendation;
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::ExportError;

pub const DEFAULT_TEMPLATE_NAME: &str = "recomendacion";

/// Patient handout. Lines starting with `#` become headings, `- ` bullets
/// and `  - ` nested bullets when converted to DOCX.
pub const DEFAULT_TEMPLATE: &str = r#"# Recomendación farmacéutica

**Paciente:** {{ patient_name }}
**Documento:** {{ document }}
**Fecha:** {{ generated_at }}

## Datos de la evaluación
- Edad: {{ age }} años
- Sexo: {{ sex }}
- Peso: {{ weight }}
- Síntomas: {{ symptoms }}
- Alergias: {{ allergies }}
- Enfermedades preexistentes: {{ diseases }}
{%- if pregnancy %}
- Embarazo: {{ pregnancy }}
{%- endif %}
- Medicación actual: {{ current_medication }}
- Duración de los síntomas: {{ duration }}
- Severidad: {{ severity }}
{% if lines | length > 0 %}
## Tratamiento sugerido
{%- for line in lines %}

### {{ loop.index }}. {{ line.medication }}
- Presentación: {{ line.form }}, vía {{ line.via }}
- Dosis: {{ line.dose }}
- Frecuencia: {{ line.frequency }}
- Duración: {{ line.duration }}
- Momento: {{ line.moment }}
- Indicaciones: {{ line.instructions }}
{%- if line.warnings | length > 0 %}
- Advertencias:
{%- for warning in line.warnings %}
  - {{ warning }}
{%- endfor %}
{%- endif %}
{%- endfor %}
{% else %}
## Derivación
{{ reason }}
{% endif %}
---
Esta recomendación no reemplaza la consulta médica.
"#;

/// Everything an export shows, independent of how it was stored.
#[derive(Debug, Clone)]
pub struct ExportDocument {
    pub recommendation_id: i64,
    pub patient: Patient,
    pub snapshot: EvaluationSnapshot,
    pub response: MedicalResponse,
    pub generated_at: jiff::Timestamp,
}

impl From<&StoredRecommendation> for ExportDocument {
    fn from(stored: &StoredRecommendation) -> Self {
        Self {
            recommendation_id: stored.id,
            patient: stored.patient.clone(),
            snapshot: stored.evaluation.snapshot.clone(),
            response: stored.to_response(),
            generated_at: stored.created_at,
        }
    }
}

/// Render any serializable value with a raw Tera template.
pub fn render_template<T: Serialize>(
    template_name: &str,
    template_content: &str,
    value: &T,
) -> Result<String, ExportError> {
    let mut tera = Tera::default();
    tera.add_raw_template(template_name, template_content)
        .map_err(|e| ExportError::TemplateParse(e.to_string()))?;

    let context = Context::from_serialize(value)?;
    Ok(tera.render(template_name, &context)?)
}

/// Render the handout with [`DEFAULT_TEMPLATE`].
pub fn render_document(document: &ExportDocument) -> Result<String, ExportError> {
    render_template(
        DEFAULT_TEMPLATE_NAME,
        DEFAULT_TEMPLATE,
        &DocumentView::new(document),
    )
}

/// Template context. Values are preformatted so the template never has to
/// deal with floats or missing fields.
#[derive(Serialize)]
struct DocumentView {
    patient_name: String,
    document: String,
    generated_at: String,
    age: u32,
    sex: &'static str,
    weight: String,
    symptoms: String,
    allergies: String,
    diseases: String,
    pregnancy: Option<&'static str>,
    current_medication: String,
    duration: String,
    severity: &'static str,
    lines: Vec<LineView>,
    reason: String,
}

#[derive(Serialize)]
struct LineView {
    medication: String,
    form: String,
    via: String,
    dose: String,
    frequency: String,
    duration: String,
    moment: String,
    instructions: String,
    warnings: Vec<String>,
}

impl DocumentView {
    fn new(document: &ExportDocument) -> Self {
        let snapshot = &document.snapshot;
        let id_code = IdentificationType::from_id(document.patient.identification_type_id)
            .map(|t| t.code())
            .unwrap_or("Documento");

        Self {
            patient_name: document.patient.full_name.clone(),
            document: format!("{id_code} {}", document.patient.identification_number),
            generated_at: document
                .generated_at
                .strftime("%Y-%m-%d %H:%M UTC")
                .to_string(),
            age: snapshot.age,
            sex: snapshot.sex.as_str(),
            weight: snapshot
                .weight
                .map(|w| format!("{} kg", format_number(w)))
                .unwrap_or_else(|| "no informado".to_string()),
            symptoms: snapshot.symptoms.join(", "),
            allergies: join_or(&snapshot.allergies, "ninguna"),
            diseases: join_or(&snapshot.preexisting_diseases, "ninguna"),
            pregnancy: snapshot.pregnancy.map(|p| if p { "sí" } else { "no" }),
            current_medication: snapshot
                .current_medication
                .clone()
                .unwrap_or_else(|| "ninguna".to_string()),
            duration: snapshot
                .symptom_duration
                .map(|d| format!("{d} días"))
                .unwrap_or_else(|| "no informada".to_string()),
            severity: snapshot.severity.map(|s| s.as_str()).unwrap_or("no informada"),
            lines: document
                .response
                .recommendations
                .iter()
                .map(LineView::new)
                .collect(),
            reason: document.response.reason.clone().unwrap_or_default(),
        }
    }
}

impl LineView {
    fn new(line: &Recommendation) -> Self {
        Self {
            medication: line.medication.clone(),
            form: line.form.clone(),
            via: line.via.clone(),
            dose: format!("{} {}", format_number(line.amount_value), line.amount_unit),
            frequency: match line.every_hour {
                0 => "sin intervalo fijo".to_string(),
                1 => "cada hora".to_string(),
                h => format!("cada {h} horas"),
            },
            duration: match line.duration_days {
                1 => "1 día".to_string(),
                d => format!("{d} días"),
            },
            moment: line.moment.clone(),
            instructions: line.instructions.clone(),
            warnings: line.warnings.clone(),
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

fn join_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}
