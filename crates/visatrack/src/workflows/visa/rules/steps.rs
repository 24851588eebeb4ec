use serde::{Deserialize, Serialize};

use super::super::domain::VisaType;
use super::VisaAssessment;

/// One entry in the step-by-step application guide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationStep {
    pub step: u32,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub forms: Vec<String>,
}

fn step(number: u32, title: &str, description: String) -> ApplicationStep {
    ApplicationStep {
        step: number,
        title: title.to_string(),
        description,
        forms: Vec::new(),
    }
}

/// Generate a walk-through for the resolved visa regime. Online and
/// embassy tracks differ; visa-free needs no application at all.
pub fn application_steps(assessment: &VisaAssessment) -> Vec<ApplicationStep> {
    let mut steps = Vec::new();

    let processing = assessment
        .processing_time
        .map(|range| format!("{}-{}", range.min, range.max))
        .unwrap_or_else(|| "a few".to_string());

    match assessment.visa_type {
        VisaType::VisaFree => {
            steps.push(step(
                1,
                "No Visa Application Needed",
                "You can travel without a visa. Just ensure your passport is valid.".to_string(),
            ));
        }
        VisaType::EVisa | VisaType::Eta | VisaType::TravelAuth => {
            let portal = assessment
                .application_url
                .as_deref()
                .unwrap_or("the official portal");
            let fee = assessment
                .fees
                .visa_cost
                .map(|cost| format!("{cost} {}", assessment.fees.currency))
                .unwrap_or_else(|| "the published fee".to_string());
            steps.push(step(
                1,
                "Gather Documents",
                "Prepare passport scan, photo, and supporting documents".to_string(),
            ));
            steps.push(step(
                2,
                "Apply Online",
                format!("Visit {portal} to submit your application"),
            ));
            steps.push(step(3, "Pay Fee", format!("Pay the visa fee of {fee}")));
            steps.push(step(
                4,
                "Wait for Approval",
                format!("Processing takes {processing} business days"),
            ));
            steps.push(step(
                5,
                "Download & Print",
                "Print your approved visa for travel".to_string(),
            ));
        }
        VisaType::EmbassyVisa | VisaType::TransitVisa => {
            steps.push(step(
                1,
                "Gather Documents",
                "Prepare all required documents as per checklist".to_string(),
            ));
            steps.push(step(
                2,
                "Book Appointment",
                "Schedule an appointment at the embassy or visa center".to_string(),
            ));
            steps.push(step(
                3,
                "Submit Application",
                "Attend appointment and submit documents".to_string(),
            ));
            steps.push(step(
                4,
                "Biometrics",
                "Provide fingerprints and photo if required".to_string(),
            ));
            steps.push(step(
                5,
                "Wait for Decision",
                format!("Processing takes {processing} business days"),
            ));
            steps.push(step(
                6,
                "Collect Passport",
                "Pick up your passport with the visa".to_string(),
            ));
        }
        VisaType::VisaOnArrival => {
            steps.push(step(
                1,
                "Prepare for Arrival",
                "Carry passport photos, the visa fee in cash, and onward tickets".to_string(),
            ));
            steps.push(step(
                2,
                "Apply at the Border",
                "Complete the visa-on-arrival counter formalities at the port of entry"
                    .to_string(),
            ));
        }
    }

    if !assessment.pre_arrival.is_empty() {
        let forms = assessment
            .pre_arrival
            .iter()
            .map(|req| req.name.clone())
            .collect();
        steps.push(ApplicationStep {
            step: steps.len() as u32 + 1,
            title: "Complete Pre-Arrival Forms".to_string(),
            description: "Submit required digital forms before travel".to_string(),
            forms,
        });
    }

    steps
}
