//! Static catalog of job-to-be-done opportunities.
//!
//! The table is built once on first access and lives for the rest of the
//! process. Records are never mutated.

use std::sync::OnceLock;

use crate::models::{Competitor, Level, OpportunityRecord, ProfitPotential};

static CATALOG: OnceLock<Vec<OpportunityRecord>> = OnceLock::new();

/// Returns the fixed opportunity catalog in insertion order.
pub fn catalog() -> &'static [OpportunityRecord] {
    CATALOG.get_or_init(build_catalog)
}

/// Looks up a catalog record by its identifier.
pub fn find(id: &str) -> Option<&'static OpportunityRecord> {
    catalog().iter().find(|r| r.id == id)
}

fn build_catalog() -> Vec<OpportunityRecord> {
    vec![
        OpportunityRecord {
            id: "construction-progress-tracking",
            title: "Real-Time Construction Progress Tracking",
            description: "Site managers reconcile construction schedules by hand from photos, \
                          daily logs and phone calls, so owners learn about delays weeks late.",
            industry: "Construction",
            pain_points: vec![
                "Progress reports are compiled manually at the end of each week",
                "Schedule slippage is discovered after it has already cost money",
                "Photos and site notes live in disconnected chat threads",
            ],
            required_functionalities: vec![
                "Mobile capture of site photos tagged to schedule tasks",
                "Automatic percent-complete estimation per work package",
                "Owner-facing dashboard with delay alerts",
            ],
            market_size: "$2.1B",
            profit_potential: ProfitPotential {
                revenue: "$45M ARR potential",
                margins: "70-80%",
                time_to_market: "9-12 months",
            },
            competition_level: Level::Medium,
            competitors: vec![
                Competitor {
                    name: "Procore",
                    description: "Broad project management suite for general contractors",
                    market_share: "35%",
                    strengths: vec!["Large install base", "Deep integrations"],
                    weaknesses: vec!["Expensive for small firms", "Progress data is manual"],
                    founded: Some(2002),
                    funding: Some("Public"),
                },
                Competitor {
                    name: "OpenSpace",
                    description: "360-degree jobsite capture with walkthrough comparisons",
                    market_share: "8%",
                    strengths: vec!["Visual documentation"],
                    weaknesses: vec!["Requires dedicated capture hardware"],
                    founded: Some(2017),
                    funding: Some("$200M Series D"),
                },
            ],
            sources: vec![
                "Associated General Contractors 2023 technology survey",
                "McKinsey: Imagining construction's digital future",
            ],
            difficulty: Level::Medium,
            tags: vec!["construction", "project management", "site monitoring", "iot"],
        },
        OpportunityRecord {
            id: "restaurant-inventory-forecasting",
            title: "AI Inventory Forecasting for Independent Restaurants",
            description: "Independent restaurants over-order perishables because purchasing \
                          is based on gut feel rather than sales history and local events.",
            industry: "Food Service",
            pain_points: vec![
                "Food waste eats 4-10% of revenue",
                "Stockouts on popular dishes during unexpected rushes",
                "Point-of-sale data is never connected to ordering",
            ],
            required_functionalities: vec![
                "POS integration for item-level sales history",
                "Demand forecast that accounts for weather and local events",
                "One-tap supplier order generation",
            ],
            market_size: "$1.4B",
            profit_potential: ProfitPotential {
                revenue: "$30M ARR potential",
                margins: "65-75%",
                time_to_market: "6-9 months",
            },
            competition_level: Level::Low,
            competitors: vec![Competitor {
                name: "MarketMan",
                description: "Back-of-house inventory and purchasing software",
                market_share: "12%",
                strengths: vec!["Supplier catalog integrations"],
                weaknesses: vec!["No predictive ordering", "Steep setup effort"],
                founded: Some(2013),
                funding: Some("$20M Series B"),
            }],
            sources: vec!["National Restaurant Association operator survey"],
            difficulty: Level::Low,
            tags: vec!["restaurants", "inventory", "forecasting", "waste reduction"],
        },
        OpportunityRecord {
            id: "freelancer-tax-compliance",
            title: "Cross-Border Tax Compliance for Freelancers",
            description: "Freelancers billing clients in several countries cannot tell which \
                          VAT, withholding and filing rules apply to each invoice.",
            industry: "Financial Services",
            pain_points: vec![
                "Invoices are issued with the wrong VAT treatment",
                "Quarterly filings require an accountant in every jurisdiction",
                "Currency conversion records are incomplete at year end",
            ],
            required_functionalities: vec![
                "Rule engine for per-country VAT and withholding",
                "Invoice generator that applies the right treatment",
                "Filing calendar with reminders",
            ],
            market_size: "$3.8B",
            profit_potential: ProfitPotential {
                revenue: "$60M ARR potential",
                margins: "75-85%",
                time_to_market: "12-18 months",
            },
            competition_level: Level::High,
            competitors: vec![
                Competitor {
                    name: "Deel",
                    description: "Global payroll and contractor payments",
                    market_share: "22%",
                    strengths: vec!["Global entity network", "Strong brand"],
                    weaknesses: vec!["Built for employers, not freelancers"],
                    founded: Some(2019),
                    funding: Some("$680M Series D"),
                },
                Competitor {
                    name: "Quaderno",
                    description: "Sales tax automation for online sellers",
                    market_share: "5%",
                    strengths: vec!["Tax rule coverage"],
                    weaknesses: vec!["No filing support"],
                    founded: Some(2012),
                    funding: None,
                },
            ],
            sources: vec!["OECD report on the platform economy", "Upwork freelance forward study"],
            difficulty: Level::High,
            tags: vec!["freelancers", "tax", "compliance", "fintech"],
        },
        OpportunityRecord {
            id: "clinic-no-show-prediction",
            title: "Patient No-Show Prediction for Small Clinics",
            description: "Small outpatient clinics lose revenue to missed appointments and \
                          have no way to overbook or remind the patients most likely to skip.",
            industry: "Healthcare",
            pain_points: vec![
                "No-show rates above 20% in some specialties",
                "Reminder calls are made by front-desk staff by hand",
                "Empty slots cannot be refilled on short notice",
            ],
            required_functionalities: vec![
                "EHR appointment feed integration",
                "Per-patient no-show risk score",
                "Automated SMS reminders and waitlist backfill",
            ],
            market_size: "$1.1B",
            profit_potential: ProfitPotential {
                revenue: "$25M ARR potential",
                margins: "70-80%",
                time_to_market: "6-12 months",
            },
            competition_level: Level::Medium,
            competitors: vec![Competitor {
                name: "Luma Health",
                description: "Patient engagement and scheduling platform",
                market_share: "10%",
                strengths: vec!["EHR integrations"],
                weaknesses: vec!["Priced for health systems"],
                founded: Some(2015),
                funding: Some("$130M Series C"),
            }],
            sources: vec!["MGMA patient access benchmark"],
            difficulty: Level::Medium,
            tags: vec!["healthcare", "scheduling", "prediction", "clinics"],
        },
        OpportunityRecord {
            id: "fleet-predictive-maintenance",
            title: "Predictive Maintenance for Small Delivery Fleets",
            description: "Regional delivery operators with under fifty vans run vehicles to \
                          failure because telematics tools are priced for enterprise fleets.",
            industry: "Logistics",
            pain_points: vec![
                "Unplanned breakdowns cancel delivery routes",
                "Maintenance is scheduled by mileage instead of condition",
                "Telematics subscriptions are too expensive per vehicle",
            ],
            required_functionalities: vec![
                "OBD-II data ingestion from low-cost dongles",
                "Failure prediction per component",
                "Workshop booking integration",
            ],
            market_size: "$1.9B",
            profit_potential: ProfitPotential {
                revenue: "$40M ARR potential",
                margins: "60-70%",
                time_to_market: "9-12 months",
            },
            competition_level: Level::Medium,
            competitors: vec![Competitor {
                name: "Samsara",
                description: "Connected operations platform for fleets",
                market_share: "30%",
                strengths: vec!["Hardware plus software bundle", "Broad sensor coverage"],
                weaknesses: vec!["Long contracts", "Enterprise pricing"],
                founded: Some(2015),
                funding: Some("Public"),
            }],
            sources: vec!["ATRI operational costs of trucking report"],
            difficulty: Level::Medium,
            tags: vec!["logistics", "fleet", "maintenance", "iot"],
        },
        OpportunityRecord {
            id: "subcontractor-compliance-tracking",
            title: "Subcontractor Compliance Tracking for General Contractors",
            description: "General contractors chase certificates of insurance, licences and \
                          safety records from dozens of subs on every construction job.",
            industry: "Construction",
            pain_points: vec![
                "Expired insurance certificates are found only after an incident",
                "Document requests are sent by email and tracked in spreadsheets",
                "Lien waivers go missing before payment release",
            ],
            required_functionalities: vec![
                "Subcontractor self-service document portal",
                "Expiry monitoring with automatic reminders",
                "Payment holds tied to missing documents",
            ],
            market_size: "$900M",
            profit_potential: ProfitPotential {
                revenue: "$35M ARR potential",
                margins: "75-85%",
                time_to_market: "6-9 months",
            },
            competition_level: Level::Low,
            competitors: vec![Competitor {
                name: "Billy",
                description: "Certificate of insurance tracking for contractors",
                market_share: "6%",
                strengths: vec!["Focused product"],
                weaknesses: vec!["Insurance only, no licences or waivers"],
                founded: Some(2019),
                funding: Some("$10M Series A"),
            }],
            sources: vec!["Dodge Data & Analytics risk management report"],
            difficulty: Level::Low,
            tags: vec!["construction", "compliance", "documents", "insurance"],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_six_records() {
        assert_eq!(catalog().len(), 6);
    }

    #[test]
    fn test_catalog_ids_unique() {
        let mut ids: Vec<&str> = catalog().iter().map(|r| r.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), catalog().len());
    }

    #[test]
    fn test_find_by_id() {
        let record = find("construction-progress-tracking").unwrap();
        assert_eq!(record.title, "Real-Time Construction Progress Tracking");
        assert!(find("does-not-exist").is_none());
    }

    #[test]
    fn test_catalog_is_shared() {
        let a = catalog().as_ptr();
        let b = catalog().as_ptr();
        assert_eq!(a, b);
    }
}
