use serde::{Deserialize, Serialize};

const NOT_AVAILABLE: &str = "N/A";

/// Input of one report relay call. Wire form: `{ imageUrl, patientName?, patientId? }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub patient_id: Option<String>,
}

impl ReportRequest {
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: Some(image_url.into()),
            ..Default::default()
        }
    }

    pub fn with_patient(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.patient_id = Some(id.into());
        self.patient_name = Some(name.into());
        self
    }

    /// The image reference, treating blank values as absent.
    pub fn image_reference(&self) -> Option<&str> {
        present(self.image_url.as_deref())
    }

    pub fn prompt(&self) -> String {
        build_report_prompt(self.patient_id.as_deref(), self.patient_name.as_deref())
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Fixed radiology report prompt. Missing or blank patient fields are rendered as `N/A`.
pub fn build_report_prompt(patient_id: Option<&str>, patient_name: Option<&str>) -> String {
    let patient_id = present(patient_id).unwrap_or(NOT_AVAILABLE);
    let patient_name = present(patient_name).unwrap_or(NOT_AVAILABLE);

    format!(
        "You are an expert radiologist. Analyze the provided medical image and write a professional radiology report.

Patient ID: {patient_id}
Patient Name: {patient_name}

Format the report in markdown using exactly this structure:

# Radiology Report

## Patient Information
Patient ID: {patient_id}
Patient Name: {patient_name}

## Analysis
Describe the imaging modality, body region, technique and image quality.

## Findings
List the observed findings systematically, noting any abnormalities with location and size where visible.

## Impression
Summarize the most likely diagnosis and any recommended follow-up.

Use precise radiological terminology and do not invent patient details."
    )
}
