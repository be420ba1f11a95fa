//! Generated marketing pages that collect contact requests.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{LandingPageId, LandingTheme, ProfileId, Slug, TypeConstraintError};

/// One content block on a landing page.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LandingSection {
    pub heading: String,
    pub body: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LandingPage {
    pub id: LandingPageId,
    pub slug: Slug,
    pub title: String,
    pub headline: String,
    pub subheadline: Option<String>,
    pub sections: Vec<LandingSection>,
    pub cta_label: String,
    pub theme: LandingTheme,
    pub published: bool,
    pub created_by: ProfileId,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl LandingPage {
    /// Tag stored on contact requests submitted through this page.
    pub fn request_source(&self) -> String {
        format!("landing:{}", self.slug)
    }
}

#[derive(Clone, Debug)]
pub struct NewLandingPage {
    pub slug: Slug,
    pub title: String,
    pub headline: String,
    pub subheadline: Option<String>,
    pub sections: Vec<LandingSection>,
    pub cta_label: String,
    pub theme: LandingTheme,
    pub created_by: ProfileId,
}

/// Inputs collected by the landing page generator form.
#[derive(Clone, Debug)]
pub struct LandingBrief {
    pub business_name: String,
    pub tagline: Option<String>,
    pub services: Vec<String>,
    pub cta_label: Option<String>,
    pub theme: LandingTheme,
}

const DEFAULT_CTA: &str = "Get in touch";

fn clean_line(value: &str) -> String {
    ammonia::clean(value).trim().to_string()
}

impl LandingBrief {
    /// Builds the page content. `suffix` keeps slugs unique across pages for
    /// the same business name.
    pub fn generate(
        &self,
        created_by: ProfileId,
        suffix: &str,
    ) -> Result<NewLandingPage, TypeConstraintError> {
        let business = clean_line(&self.business_name);
        if business.is_empty() {
            return Err(TypeConstraintError::EmptyString);
        }

        let services: Vec<String> = self
            .services
            .iter()
            .map(|s| clean_line(s))
            .filter(|s| !s.is_empty())
            .collect();

        let headline = match services.as_slice() {
            [] => format!("{business}: service you can count on"),
            [only] => format!("{business}: {only}"),
            [first, second] => format!("{business}: {first} and {second}"),
            [first, second, ..] => format!("{business}: {first}, {second} and more"),
        };

        let subheadline = self
            .tagline
            .as_deref()
            .map(clean_line)
            .filter(|t| !t.is_empty());

        let sections = services
            .iter()
            .map(|service| LandingSection {
                heading: service.clone(),
                body: format!(
                    "{business} offers {} tailored to your needs. Tell us what you need and we will get back to you.",
                    service.to_lowercase()
                ),
            })
            .collect();

        let cta_label = self
            .cta_label
            .as_deref()
            .map(clean_line)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CTA.to_string());

        let slug = Slug::slugify(&format!("{business} {suffix}"))?;

        Ok(NewLandingPage {
            slug,
            title: business,
            headline,
            subheadline,
            sections,
            cta_label,
            theme: self.theme,
            created_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brief(services: &[&str]) -> LandingBrief {
        LandingBrief {
            business_name: "Nordic Cleaning".to_string(),
            tagline: Some("  Spotless, every time ".to_string()),
            services: services.iter().map(|s| s.to_string()).collect(),
            cta_label: None,
            theme: LandingTheme::Light,
        }
    }

    #[test]
    fn generates_headline_sections_and_slug() {
        let author = ProfileId::new(1).unwrap();
        let page = brief(&["Office cleaning", "", "Window washing", "Carpets"])
            .generate(author, "ab12")
            .unwrap();

        assert_eq!(page.slug.as_str(), "nordic-cleaning-ab12");
        assert_eq!(
            page.headline,
            "Nordic Cleaning: Office cleaning, Window washing and more"
        );
        assert_eq!(page.subheadline.as_deref(), Some("Spotless, every time"));
        assert_eq!(page.sections.len(), 3);
        assert_eq!(page.cta_label, DEFAULT_CTA);
    }

    #[test]
    fn headline_without_services() {
        let page = brief(&[])
            .generate(ProfileId::new(1).unwrap(), "x1")
            .unwrap();
        assert_eq!(page.headline, "Nordic Cleaning: service you can count on");
        assert!(page.sections.is_empty());
    }

    #[test]
    fn blank_business_name_is_rejected() {
        let mut brief = brief(&["A"]);
        brief.business_name = "<script>x</script>".to_string();
        assert!(brief.generate(ProfileId::new(1).unwrap(), "zz").is_err());
    }
}
