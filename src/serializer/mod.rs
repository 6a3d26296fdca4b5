//! Client rule-list serializers.
//!
//! Every serializer is a pure function of a [`SerializableRuleModel`] and
//! [`SerializationOptions`]. A logical rule a client cannot express is logged
//! and left out of that client's output only.

pub mod clash;
pub mod egern;
pub mod loon;
pub mod sing_box;
pub mod surge;

use std::fmt;

use crate::logical::{to_text, LogicalTree, TextDialect};
use crate::ruleset::{SerializableRuleModel, SerializationOptions};
use crate::Result;

pub use clash::ClashPayload;

/// Supported output clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Client {
    Surge,
    Loon,
    Clash,
    Egern,
    SingBox,
}

impl Client {
    /// Every client.
    pub const ALL: [Client; 5] = [
        Client::Surge,
        Client::Loon,
        Client::Clash,
        Client::Egern,
        Client::SingBox,
    ];

    /// Parse a client name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "surge" => Some(Client::Surge),
            "loon" => Some(Client::Loon),
            "clash" | "mihomo" => Some(Client::Clash),
            "egern" => Some(Client::Egern),
            "sing-box" | "singbox" | "sing_box" => Some(Client::SingBox),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Client::Surge => "surge",
            Client::Loon => "loon",
            Client::Clash => "clash",
            Client::Egern => "egern",
            Client::SingBox => "sing-box",
        }
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub client: Client,
    /// Distinguishes multiple documents for one client, e.g. a Clash behavior.
    pub variant: Option<&'static str>,
    /// File extension without the dot.
    pub extension: &'static str,
    pub content: String,
}

impl Output {
    /// File name for a rule set called `name`.
    pub fn file_name(&self, name: &str) -> String {
        match self.variant {
            Some(variant) => format!("{}_{}.{}", name, variant, self.extension),
            None => format!("{}.{}", name, self.extension),
        }
    }
}

/// Render `model` for one client.
pub fn serialize(
    client: Client,
    model: &SerializableRuleModel,
    options: &SerializationOptions,
) -> Result<Vec<Output>> {
    let single = |content: Option<String>, extension: &'static str| {
        content
            .map(|content| Output {
                client,
                variant: None,
                extension,
                content,
            })
            .into_iter()
            .collect::<Vec<_>>()
    };

    let outputs = match client {
        Client::Surge => single(surge::serialize(model, options), "list"),
        Client::Loon => single(loon::serialize(model, options), "list"),
        Client::Egern => single(egern::serialize(model, options)?, "yaml"),
        Client::SingBox => single(sing_box::serialize(model, options)?, "json"),
        Client::Clash => {
            let payloads = clash::serialize(model, options)?;
            let split = payloads.len() > 1;
            payloads
                .into_iter()
                .map(|payload| Output {
                    client,
                    variant: split.then_some(payload.behavior.as_str()),
                    extension: "yaml",
                    content: payload.content,
                })
                .collect()
        }
    };
    Ok(outputs)
}

/// Render logical trees as text, dropping the ones the dialect rejects.
pub(crate) fn logical_lines<D: TextDialect>(trees: &[LogicalTree], dialect: &D) -> Vec<String> {
    trees
        .iter()
        .filter_map(|tree| match to_text(tree, dialect) {
            Ok(line) => Some(line),
            Err(e) => {
                log::error!("rule: '{}', err: {}", tree, e);
                None
            }
        })
        .collect()
}

/// Prefix newline-joined rules with a `# Total: N rules` header.
pub(crate) fn with_total_header(rules: &[String]) -> Option<String> {
    if rules.is_empty() {
        return None;
    }
    Some(format!("# Total: {} rules\n{}", rules.len(), rules.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::ClashBehavior;

    fn model() -> SerializableRuleModel {
        SerializableRuleModel {
            domain_suffix: vec!["example.com".to_string()],
            ip_cidr: vec!["10.0.0.0/8".parse().unwrap()],
            ..Default::default()
        }
    }

    #[test]
    fn test_client_parse() {
        for client in Client::ALL {
            assert_eq!(Client::parse(client.as_str()), Some(client));
        }
        assert_eq!(Client::parse("SingBox"), Some(Client::SingBox));
        assert_eq!(Client::parse("quantumult"), None);
    }

    #[test]
    fn test_serialize_every_client() {
        let options = SerializationOptions::default();
        for client in Client::ALL {
            let outputs = serialize(client, &model(), &options).unwrap();
            assert_eq!(outputs.len(), 1, "{}", client);
            assert!(!outputs[0].content.is_empty());
        }
    }

    #[test]
    fn test_empty_model_has_no_output() {
        let options = SerializationOptions::default();
        for client in Client::ALL {
            let outputs = serialize(client, &SerializableRuleModel::default(), &options).unwrap();
            assert!(outputs.is_empty(), "{}", client);
        }
    }

    #[test]
    fn test_file_name() {
        let output = Output {
            client: Client::Clash,
            variant: Some(ClashBehavior::Domain.as_str()),
            extension: "yaml",
            content: String::new(),
        };
        assert_eq!(output.file_name("ads"), "ads_domain.yaml");
    }
}
