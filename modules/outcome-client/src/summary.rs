use serde::Serialize;

use crate::extract::{extract_urls, software_name};
use crate::types::{ProjectAnalysis, SoftwareProduct};

/// Counts shown above the software list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalysisSummary {
    pub total_outcomes: usize,
    pub classified_as_software: usize,
    pub extracted: usize,
    /// `extracted / classified_as_software` as a rounded percentage, 0 when nothing was
    /// classified.
    pub success_rate_percent: u32,
}

impl AnalysisSummary {
    pub fn from_analysis(analysis: &ProjectAnalysis) -> Self {
        let outcomes = &analysis.outcomes_analysis;
        let classified_as_software = outcomes.iter().filter(|o| o.is_software()).count();
        let extracted = outcomes.iter().filter(|o| o.is_extracted_software()).count();

        let success_rate_percent = if classified_as_software > 0 {
            ((extracted as f64 / classified_as_software as f64) * 100.0).round() as u32
        } else {
            0
        };

        Self {
            total_outcomes: outcomes.len(),
            classified_as_software,
            extracted,
            success_rate_percent,
        }
    }

    /// Classified outcomes that lacked enough detail to extract.
    pub fn insufficient_detail(&self) -> usize {
        self.classified_as_software.saturating_sub(self.extracted)
    }

    pub fn status_message(&self) -> String {
        if self.extracted > 0 {
            if self.classified_as_software > self.extracted {
                format!(
                    "Analysis complete! Found {} software products (from {} potential matches).",
                    self.extracted, self.classified_as_software
                )
            } else {
                format!("Analysis complete! Found {} software products.", self.extracted)
            }
        } else if self.classified_as_software > 0 {
            format!(
                "Analysis complete. Classifier identified {} potential software-related outcomes, \
                 but none contained sufficient detail for extraction.",
                self.classified_as_software
            )
        } else {
            "Analysis complete. No software-related outcomes were identified.".to_string()
        }
    }
}

/// Software outcomes with usable extraction text, in response order.
pub fn software_products(analysis: &ProjectAnalysis) -> Vec<SoftwareProduct> {
    analysis
        .outcomes_analysis
        .iter()
        .filter(|o| o.is_extracted_software())
        .filter_map(|o| o.final_output_text())
        .map(|text| SoftwareProduct {
            name: software_name(Some(text)),
            description: text.to_string(),
            urls: extract_urls(text),
        })
        .collect()
}
