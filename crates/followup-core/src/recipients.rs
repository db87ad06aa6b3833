use crate::message::{OutboundMessage, TargetRecord};

/// Placeholder identifier when the only evidence of an external recipient is
/// a raw sender address on the message.
pub const UNRESOLVED_CONTACT: &str = "External Contact";

/// Extract the message's external recipients as printable identifiers.
///
/// Rules, in priority order, stopping at the first that yields anything:
/// 1. addressees without a linked internal account, in iteration order;
/// 2. the record's designated customer, when it lacks an internal account;
/// 3. the [`UNRESOLVED_CONTACT`] placeholder, when the message carries a raw
///    sender address.
///
/// Never fails; an empty result means nothing external to report.
pub fn resolve_external_recipients(
    message: &OutboundMessage,
    record: &TargetRecord,
) -> Vec<String> {
    let mut recipients: Vec<String> = message
        .addressees
        .iter()
        .filter(|a| a.is_external())
        .map(|a| a.printable().to_string())
        .filter(|id| !id.is_empty())
        .collect();

    if recipients.is_empty() {
        if let Some(customer) = &record.customer {
            if customer.is_external() && !customer.printable().is_empty() {
                recipients.push(customer.printable().to_string());
            }
        }
    }

    if recipients.is_empty() && message.sender_address.is_some() {
        recipients.push(UNRESOLVED_CONTACT.to_string());
    }

    recipients
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
