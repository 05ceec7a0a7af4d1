//! # Command Parsing
//!
//! Turns the raw text of a chat message into a [`Request`].
//! Builtin keywords win; otherwise learned commands go through the fallback parser.

use anyhow::Result;

use crate::application::registry::FeatureRegistry;
use crate::domain::traits::StringMap;
use crate::domain::types::Request;

pub const SIGIL: char = '?';

/// Splits on single spaces, so repeated or trailing spaces yield empty tokens.
pub fn tokenize(content: &str) -> Vec<&str> {
    content.split(' ').collect()
}

/// Everything after the keyword, space-joined. Empty when there is nothing.
pub fn rest(tokens: &[&str]) -> String {
    tokens.get(1..).map(|t| t.join(" ")).unwrap_or_default()
}

pub async fn parse_command(
    content: &str,
    registry: &FeatureRegistry,
    commands: &dyn StringMap,
) -> Result<Request> {
    if !content.starts_with(SIGIL) {
        return Ok(Request::None);
    }
    let tokens = tokenize(content);
    let keyword = tokens[0];

    if let Some(parser) = registry.parser_by_name(keyword) {
        return parser.parse(&tokens);
    }

    let call = &keyword[SIGIL.len_utf8()..];
    if !call.is_empty() && commands.has(call).await? {
        if let Some(fallback) = registry.fallback_parser() {
            return fallback.parse(&tokens);
        }
        tracing::warn!("Custom command ?{} matched but no fallback parser is registered", call);
    }

    Ok(Request::Unrecognized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::store::InMemoryStringMap;
    use crate::domain::types::{CustomData, HelpData};
    use crate::interface::commands;

    async fn registry_and_commands() -> (FeatureRegistry, InMemoryStringMap) {
        let map = InMemoryStringMap::new();
        map.set("hello", "world").await.unwrap();
        let mut registry = FeatureRegistry::new();
        registry.register(&commands::help::HelpFeature).unwrap();
        registry
            .register(&commands::custom::CustomFeature::new(std::sync::Arc::new(
                InMemoryStringMap::new(),
            )))
            .unwrap();
        (registry, map)
    }

    #[test]
    fn test_tokenize_keeps_empty_tokens() {
        assert_eq!(tokenize("?learn "), vec!["?learn", ""]);
        assert_eq!(tokenize("?a  b"), vec!["?a", "", "b"]);
        assert_eq!(rest(&["?vote"]), "");
        assert_eq!(rest(&["?vote", "a", "b"]), "a b");
    }

    #[tokio::test]
    async fn test_non_sigil_input_is_none() {
        let (registry, map) = registry_and_commands().await;
        for input in ["", "help", "!help", ".help", "hello ?help"] {
            assert_eq!(
                parse_command(input, &registry, &map).await.unwrap(),
                Request::None,
                "input {input:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_unknown_keyword_is_unrecognized() {
        let (registry, map) = registry_and_commands().await;
        for input in ["?", "?nope", "?HELP", "? help"] {
            assert_eq!(
                parse_command(input, &registry, &map).await.unwrap(),
                Request::Unrecognized,
                "input {input:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_builtin_and_custom_dispatch() {
        let (registry, map) = registry_and_commands().await;
        assert_eq!(
            parse_command("?help", &registry, &map).await.unwrap(),
            Request::Help(HelpData { command: None })
        );
        assert_eq!(
            parse_command("?hello there you", &registry, &map).await.unwrap(),
            Request::Custom(CustomData {
                call: "hello".to_string(),
                args: "there you".to_string(),
            })
        );
    }
}
