//! Prompt assembly for grounded chat replies

use crate::llm::ChatMessage;
use crate::rag::RetrievedDocument;

/// Build the system instruction for a given store type
#[must_use]
pub fn build_system_prompt(business_type: &str) -> String {
    format!(
        "You are a helpful sales assistant for a {business_type} store. \
         Always prioritize the context and products already mentioned in the \
         conversation history if the user refers to 'those products', 'the \
         previous ones', or similar. Only use the retrieved product list if \
         the user is asking for new or additional options. Respond in a \
         friendly and professional manner, based solely on the available \
         products. If there are no relevant products, clearly indicate it. \
         Always be helpful and provide accurate information about the \
         products."
    )
}

/// Render one retrieved document as a context line
fn format_document(document: &RetrievedDocument) -> String {
    let quantity = document
        .metadata
        .quantity
        .map_or_else(|| "N/A".to_string(), |q| q.to_string());
    let price = document
        .metadata
        .price
        .map_or_else(|| "N/A".to_string(), |p| p.to_string());

    format!("- {}x {} (Price: ${})", quantity, document.text, price)
}

/// Render all retrieved documents as one context block
#[must_use]
pub fn build_context_block(documents: &[RetrievedDocument]) -> String {
    documents
        .iter()
        .map(format_document)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assemble the full exchange sent to the completion backend
///
/// The order is fixed: system instruction, prior history verbatim, one
/// synthetic context entry when any documents were retrieved, then the
/// current user message. Retrieved documents never interleave with history.
#[must_use]
pub fn build_chat_prompt(
    documents: &[RetrievedDocument],
    user_message: &str,
    history: &[ChatMessage],
    business_type: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 3);

    messages.push(ChatMessage::system(build_system_prompt(business_type)));
    messages.extend(history.iter().cloned());

    if !documents.is_empty() {
        let context_block = build_context_block(documents);
        messages.push(ChatMessage::user(format!(
            "Relevant context:\n{context_block}"
        )));
    }

    messages.push(ChatMessage::user(user_message));

    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::DocumentMetadata;

    fn doc(text: &str, price: Option<f64>, quantity: Option<i32>) -> RetrievedDocument {
        RetrievedDocument {
            text: text.to_string(),
            score: 0.5,
            metadata: DocumentMetadata { price, quantity },
        }
    }

    #[test]
    fn test_prompt_order_with_history_and_context() {
        let history = vec![
            ChatMessage::user("Hi"),
            ChatMessage::assistant("Hello! How can I help?"),
        ];
        let documents = vec![doc("Wireless Sensor Acme", Some(19.99), Some(3))];

        let messages = build_chat_prompt(
            &documents,
            "Do you have wireless sensors?",
            &history,
            "e-commerce",
        );

        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[2].role, "assistant");
        assert_eq!(messages[3].role, "user");
        assert!(messages[3].content.starts_with("Relevant context:\n"));
        assert_eq!(messages[4].role, "user");
        assert_eq!(messages[4].content, "Do you have wireless sensors?");
    }

    #[test]
    fn test_no_context_entry_without_documents() {
        let history = vec![ChatMessage::user("Hi")];

        let messages = build_chat_prompt(&[], "Anything in stock?", &history, "e-commerce");

        assert_eq!(messages.len(), 3);
        assert!(!messages.iter().any(|m| m.content.contains("Relevant context")));
        assert_eq!(messages[2].content, "Anything in stock?");
    }

    #[test]
    fn test_history_precedes_context() {
        let history = vec![
            ChatMessage::user("one"),
            ChatMessage::assistant("two"),
            ChatMessage::user("three"),
        ];
        let documents = vec![doc("Thermostat Acme", Some(49.0), Some(1))];

        let messages = build_chat_prompt(&documents, "current", &history, "hardware");

        // history verbatim in positions 1..=3, context at 4, current last
        assert_eq!(messages[1].content, "one");
        assert_eq!(messages[2].content, "two");
        assert_eq!(messages[3].content, "three");
        assert!(messages[4].content.starts_with("Relevant context:"));
        assert_eq!(messages[5].content, "current");
    }

    #[test]
    fn test_context_line_format() {
        let line = build_context_block(&[doc("Wireless Sensor Acme", Some(19.99), Some(3))]);
        assert_eq!(line, "- 3x Wireless Sensor Acme (Price: $19.99)");
    }

    #[test]
    fn test_missing_metadata_renders_na() {
        let line = build_context_block(&[doc("Mystery Item", None, None)]);
        assert_eq!(line, "- N/Ax Mystery Item (Price: $N/A)");
    }

    #[test]
    fn test_system_prompt_mentions_business_type() {
        let prompt = build_system_prompt("hardware");
        assert!(prompt.starts_with("You are a helpful sales assistant for a hardware store."));
    }
}
