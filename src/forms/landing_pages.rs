use serde::Deserialize;
use validator::Validate;

use crate::domain::landing_page::LandingBrief;
use crate::domain::types::LandingTheme;
use crate::forms::{FormError, non_blank};

#[derive(Debug, Deserialize, Validate)]
/// Generator input. `services` holds one service per line.
pub struct LandingPageForm {
    #[validate(length(min = 1, max = 120))]
    pub business_name: String,
    #[serde(default)]
    #[validate(length(max = 300))]
    pub tagline: Option<String>,
    #[serde(default)]
    pub services: String,
    #[serde(default)]
    #[validate(length(max = 60))]
    pub cta_label: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
}

impl TryFrom<LandingPageForm> for LandingBrief {
    type Error = FormError;

    fn try_from(form: LandingPageForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let theme = match non_blank(form.theme) {
            Some(theme) => theme
                .parse()
                .map_err(|_| FormError::InvalidPayload(format!("unknown theme {theme}")))?,
            None => LandingTheme::Light,
        };

        let services = form
            .services
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        Ok(LandingBrief {
            business_name: form.business_name,
            tagline: non_blank(form.tagline),
            services,
            cta_label: non_blank(form.cta_label),
            theme,
        })
    }
}
