//! The fixed model catalog.

use url::Url;

use crate::config::{ConfigError, UpstreamConfig};
use crate::error::Error;

/// Model fulfilled by redirecting to a public image URL.
pub const MODEL_FLUX: &str = "flux";
/// Model fulfilled by relaying to the magicstudio art API.
pub const MODEL_MAGICSTUDIO: &str = "magicstudio";
/// Model fulfilled by relaying to the creart text2image API.
pub const MODEL_CREART: &str = "creart-ai";

/// Which multipart field set the upstream API expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSet {
    MagicStudio,
    CreartAi,
}

/// An upstream API reached by a relayed POST.
#[derive(Debug, Clone)]
pub struct RelayTarget {
    /// Endpoint receiving the multipart POST.
    pub url: String,
    /// Browser-shaped origin header, where the API checks for one.
    pub origin: Option<&'static str>,
    pub referer: Option<&'static str>,
    pub fields: FieldSet,
}

/// How a request for a given model is fulfilled.
#[derive(Debug, Clone)]
pub enum Dispatch {
    /// 302 to a public image URL; no outbound call from this process.
    Redirect,
    /// POST to an upstream API and relay the bytes back.
    Relay(RelayTarget),
}

impl Dispatch {
    pub fn kind(&self) -> &'static str {
        match self {
            Dispatch::Redirect => "redirect",
            Dispatch::Relay(_) => "relay",
        }
    }
}

/// A model available for selection.
#[derive(Debug, Clone)]
pub struct ModelSpec {
    pub name: &'static str,
    pub dispatch: Dispatch,
}

/// Immutable catalog mapping model names to dispatch descriptors.
///
/// Built once at startup from [`UpstreamConfig`] and shared read-only across
/// requests; there is no runtime mutation.
#[derive(Debug, Clone)]
pub struct Catalog {
    specs: Vec<ModelSpec>,
    pollinations: Url,
}

impl Catalog {
    /// Build the catalog from upstream configuration.
    pub fn new(upstream: &UpstreamConfig) -> Result<Self, ConfigError> {
        let pollinations = Url::parse(&upstream.pollinations_url).map_err(|e| {
            ConfigError::Validation(format!(
                "Invalid upstream.pollinations_url '{}': {}",
                upstream.pollinations_url, e
            ))
        })?;
        if pollinations.cannot_be_a_base() {
            return Err(ConfigError::Validation(format!(
                "Invalid upstream.pollinations_url '{}': not a base URL",
                upstream.pollinations_url
            )));
        }

        let specs = vec![
            ModelSpec {
                name: MODEL_FLUX,
                dispatch: Dispatch::Redirect,
            },
            ModelSpec {
                name: MODEL_MAGICSTUDIO,
                dispatch: Dispatch::Relay(RelayTarget {
                    url: upstream.magicstudio_url.clone(),
                    origin: Some("https://magicstudio.com"),
                    referer: Some("https://magicstudio.com/ai-art-generator/"),
                    fields: FieldSet::MagicStudio,
                }),
            },
            ModelSpec {
                name: MODEL_CREART,
                dispatch: Dispatch::Relay(RelayTarget {
                    url: upstream.creart_url.clone(),
                    origin: None,
                    referer: None,
                    fields: FieldSet::CreartAi,
                }),
            },
        ];

        Ok(Self {
            specs,
            pollinations,
        })
    }

    /// Look up a model by name.
    ///
    /// The error message enumerates the valid model set, which is part of
    /// the external contract.
    pub fn select(&self, model: &str) -> Result<&ModelSpec, Error> {
        self.specs
            .iter()
            .find(|spec| spec.name == model)
            .ok_or_else(|| Error::UnknownModel {
                available: self.names().join(", "),
            })
    }

    /// Model names in catalog order.
    pub fn names(&self) -> Vec<&'static str> {
        self.specs.iter().map(|spec| spec.name).collect()
    }

    /// All model specs.
    pub fn specs(&self) -> &[ModelSpec] {
        &self.specs
    }

    /// Public image URL for the flux redirect strategy.
    pub fn redirect_url(&self, prompt: &str) -> String {
        self.pollinations_url(prompt, "flux", false)
    }

    /// Public image URL for the flux-realism source used by /permanent.
    pub fn realism_url(&self, prompt: &str) -> String {
        self.pollinations_url(prompt, "flux-realism", true)
    }

    fn pollinations_url(&self, prompt: &str, model: &str, unfiltered: bool) -> String {
        let mut url = self.pollinations.clone();
        url.path_segments_mut()
            .expect("base URL validated in Catalog::new")
            .pop_if_empty()
            .push("prompt")
            .push(prompt);
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("model", model)
                .append_pair("width", "1024")
                .append_pair("height", "1024")
                .append_pair("nologo", "true");
            if unfiltered {
                query.append_pair("safe", "0");
            }
        }
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UpstreamConfig;

    fn test_catalog() -> Catalog {
        Catalog::new(&UpstreamConfig::default()).unwrap()
    }

    #[test]
    fn test_names_fixed_order() {
        let catalog = test_catalog();
        assert_eq!(catalog.names(), vec!["flux", "magicstudio", "creart-ai"]);
    }

    #[test]
    fn test_select_flux_is_redirect() {
        let catalog = test_catalog();
        let spec = catalog.select("flux").unwrap();
        assert!(matches!(spec.dispatch, Dispatch::Redirect));
    }

    #[test]
    fn test_select_magicstudio_has_browser_headers() {
        let catalog = test_catalog();
        let spec = catalog.select("magicstudio").unwrap();
        match &spec.dispatch {
            Dispatch::Relay(target) => {
                assert_eq!(target.origin, Some("https://magicstudio.com"));
                assert_eq!(
                    target.referer,
                    Some("https://magicstudio.com/ai-art-generator/")
                );
                assert_eq!(target.fields, FieldSet::MagicStudio);
            }
            Dispatch::Redirect => panic!("magicstudio should be a relay model"),
        }
    }

    #[test]
    fn test_select_creart_has_no_extra_headers() {
        let catalog = test_catalog();
        let spec = catalog.select("creart-ai").unwrap();
        match &spec.dispatch {
            Dispatch::Relay(target) => {
                assert_eq!(target.origin, None);
                assert_eq!(target.referer, None);
                assert_eq!(target.fields, FieldSet::CreartAi);
            }
            Dispatch::Redirect => panic!("creart-ai should be a relay model"),
        }
    }

    #[test]
    fn test_select_unknown_model_lists_available() {
        let catalog = test_catalog();
        let err = catalog.select("dalle").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid model. Available models: flux, magicstudio, creart-ai"
        );
    }

    #[test]
    fn test_redirect_url_shape() {
        let catalog = test_catalog();
        let url = catalog.redirect_url("cat");
        assert!(url.starts_with("https://image.pollinations.ai/prompt/cat?"));
        assert!(url.contains("model=flux"));
        assert!(url.contains("width=1024"));
        assert!(url.contains("height=1024"));
        assert!(url.contains("nologo=true"));
        assert!(!url.contains("safe=0"));
    }

    #[test]
    fn test_redirect_url_encodes_prompt() {
        let catalog = test_catalog();
        let url = catalog.redirect_url("white cat, oil painting");
        assert!(url.contains("/prompt/white%20cat,%20oil%20painting"));
    }

    #[test]
    fn test_realism_url_is_unfiltered() {
        let catalog = test_catalog();
        let url = catalog.realism_url("cat");
        assert!(url.contains("model=flux-realism"));
        assert!(url.contains("safe=0"));
    }

    #[test]
    fn test_invalid_pollinations_url_rejected() {
        let upstream = UpstreamConfig {
            pollinations_url: "not a url".to_string(),
            ..UpstreamConfig::default()
        };
        assert!(Catalog::new(&upstream).is_err());
    }
}
