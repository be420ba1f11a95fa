use serde::Serialize;

use crate::domain::landing_page::LandingPage;

#[derive(Debug, Serialize)]
pub struct LandingPagesData {
    pub pages: Vec<LandingPage>,
}
