//! Shared fixtures for the rendering tests.

use stories_core::brands::BrandResolver;
use stories_core::models::AnalysisOptions;
use stories_runtime::dashboard::{Dashboard, Upload};
use stories_runtime::view::{DashboardView, ViewQuery};

pub const CURRENT_CSV: &str = "\
brand,content_type,date,impressions,reach,interactions,replies,shares
A,Photo,2024-01-15,1000,800,80,12,6
A,Video,2024-02-10,1500,1200,60,8,4
B,Photo,2024-01-20,400,300,45,5,0
B,Story,2024-03-05,250,200,0,0,0
";

pub const PRIOR_CSV: &str = "\
brand,content_type,date,impressions,reach,interactions,replies,shares
A,Photo,2023-01-20,900,700,56,10,2
A,Video,2023-02-11,1100,1000,70,6,6
B,Photo,2023-01-02,350,250,20,3,1
C,Story,2023-04-01,90,80,8,1,0
";

/// A view over both fixture files with default options.
pub fn sample_view() -> DashboardView {
    let dashboard = Dashboard::new(AnalysisOptions::default(), BrandResolver::default());
    let id = dashboard
        .upload(
            None,
            Upload {
                file_name: "current.csv",
                bytes: CURRENT_CSV.as_bytes(),
            },
            Upload {
                file_name: "prior.csv",
                bytes: PRIOR_CSV.as_bytes(),
            },
        )
        .expect("fixture upload");
    dashboard
        .view(Some(&id), &ViewQuery::default())
        .expect("fixture view")
}
