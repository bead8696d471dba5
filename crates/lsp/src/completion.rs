//! Completion catalogue for Sun documents.
//!
//! Offers every keyword, directive and snippet template regardless of the
//! cursor position; editors filter by prefix.

use lsp_types::{
    CompletionItem, CompletionItemKind, Documentation, InsertTextFormat, MarkupContent,
    MarkupKind,
};
use sun_core::KeywordDictionary;

/// Snippet templates: (label, detail, body).
static SNIPPETS: &[(&str, &str, &str)] = &[
    (
        "function",
        "function declaration",
        "function ${1:name}(${2:params}) {\n\t$0\n}",
    ),
    (
        "component",
        "component declaration",
        "component ${1:Name} {\n\trender $0\n}",
    ),
    ("when", "conditional", "when ${1:condition} then ${2:result}"),
    ("let", "binding", "let ${1:name} = ${2:value}"),
    ("state", "component state", "state ${1:name} = ${2:initial}"),
    ("import", "module import", "import \"${1:module}\""),
];

fn markdown(value: &str) -> Documentation {
    Documentation::MarkupContent(MarkupContent {
        kind: MarkupKind::Markdown,
        value: value.to_string(),
    })
}

pub fn compute_completions(dictionary: &KeywordDictionary) -> Vec<CompletionItem> {
    let mut items = Vec::new();

    for kw in &dictionary.keywords {
        items.push(CompletionItem {
            label: kw.clone(),
            kind: Some(CompletionItemKind::KEYWORD),
            detail: Some("keyword".to_string()),
            documentation: dictionary.describe(kw).map(markdown),
            ..Default::default()
        });
    }

    for (name, desc) in &dictionary.directives {
        items.push(CompletionItem {
            label: name.clone(),
            kind: Some(CompletionItemKind::MODULE),
            detail: Some(desc.clone()),
            ..Default::default()
        });
    }

    for (label, detail, body) in SNIPPETS {
        items.push(CompletionItem {
            label: label.to_string(),
            kind: Some(CompletionItemKind::SNIPPET),
            detail: Some(detail.to_string()),
            insert_text: Some(body.to_string()),
            insert_text_format: Some(InsertTextFormat::SNIPPET),
            ..Default::default()
        });
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_has_keywords_directives_and_snippets() {
        let items = compute_completions(KeywordDictionary::builtin());
        let has = |label: &str, kind: CompletionItemKind| {
            items.iter().any(|i| i.label == label && i.kind == Some(kind))
        };
        assert!(has("when", CompletionItemKind::KEYWORD));
        assert!(has("@use", CompletionItemKind::MODULE));
        assert!(has("function", CompletionItemKind::SNIPPET));
        assert!(items
            .iter()
            .filter(|i| i.kind == Some(CompletionItemKind::SNIPPET))
            .all(|i| i.insert_text_format == Some(InsertTextFormat::SNIPPET)));
    }
}
