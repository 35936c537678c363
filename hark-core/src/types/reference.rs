//! Per-call reference records: the ground truth rules are checked against.

use serde::{Deserialize, Serialize};

/// A scalar reference field viewed for condition evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Bool(bool),
    Text(&'a str),
}

/// Ground truth for one call: who spoke, which account state applies, and
/// which legal flags are in force. Misses during resolution degrade to
/// [`ReferenceRecord::fallback`], never to an absent record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceRecord {
    pub agent_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_alias: Option<String>,
    pub customer_name: String,
    pub customer_state: String,
    pub company_name: String,
    pub do_not_call: bool,
    pub attorney_retained: bool,
    pub bankruptcy_filed: bool,
    pub cease_and_desist: bool,
    pub cure_period_expired: bool,
    pub third_party_risk: bool,
    pub voicemail_context: bool,
    /// Rule ids expected to fire for this call. Accuracy-report ground
    /// truth only; never consulted by a violation decision.
    pub expected_violations: Vec<String>,
}

impl ReferenceRecord {
    /// The record used when both lookup namespaces miss.
    pub fn fallback() -> Self {
        Self {
            agent_name: "John Smith".to_string(),
            agent_alias: None,
            customer_name: "Robert Williams".to_string(),
            customer_state: "TX".to_string(),
            company_name: "AnyCompany Financial".to_string(),
            ..Self::default()
        }
    }

    /// Build a record from raw reference lists, deriving the boolean flags:
    /// `do_not_call` when any expected violation mentions DNC,
    /// `attorney_retained` when any legal term is present,
    /// `bankruptcy_filed` / `cease_and_desist` from legal term keywords,
    /// state from the first state reference (default `TX`).
    pub fn from_raw_lists(
        agent_names: &[String],
        customer_names: &[String],
        companies: &[String],
        legal_terms: &[String],
        state_references: &[String],
        expected_violations: Vec<String>,
    ) -> Self {
        let fallback = Self::fallback();
        let first_or = |values: &[String], default: &str| {
            values
                .first()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let do_not_call = expected_violations
            .iter()
            .any(|v| v.to_lowercase().contains("dnc"));
        let attorney_retained = !legal_terms.is_empty();
        let bankruptcy_filed = legal_terms
            .iter()
            .any(|t| t.to_lowercase().contains("bankruptcy"));
        let cease_and_desist = legal_terms
            .iter()
            .any(|t| t.to_lowercase().contains("cease"));

        Self {
            agent_name: first_or(agent_names, &fallback.agent_name),
            agent_alias: None,
            customer_name: first_or(customer_names, &fallback.customer_name),
            customer_state: first_or(state_references, &fallback.customer_state),
            company_name: first_or(companies, &fallback.company_name),
            do_not_call,
            attorney_retained,
            bankruptcy_filed,
            cease_and_desist,
            cure_period_expired: false,
            third_party_risk: false,
            voicemail_context: false,
            expected_violations,
        }
    }

    /// The agent's first name, used for alias comparisons.
    pub fn agent_first_name(&self) -> &str {
        self.agent_name.split_whitespace().next().unwrap_or("")
    }

    /// Look up a field by its condition-map name. Unknown names return
    /// `None`, which fails the condition rather than erroring.
    pub fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "do_not_call" => Some(FieldValue::Bool(self.do_not_call)),
            "attorney_retained" => Some(FieldValue::Bool(self.attorney_retained)),
            "bankruptcy_filed" => Some(FieldValue::Bool(self.bankruptcy_filed)),
            "cease_and_desist" => Some(FieldValue::Bool(self.cease_and_desist)),
            "cure_period_expired" => Some(FieldValue::Bool(self.cure_period_expired)),
            "third_party_risk" => Some(FieldValue::Bool(self.third_party_risk)),
            "voicemail_context" => Some(FieldValue::Bool(self.voicemail_context)),
            "state" | "customer_state" => Some(FieldValue::Text(&self.customer_state)),
            "agent_name" => Some(FieldValue::Text(&self.agent_name)),
            "customer_name" => Some(FieldValue::Text(&self.customer_name)),
            "company" | "company_name" => Some(FieldValue::Text(&self.company_name)),
            _ => None,
        }
    }

    /// Look up a boolean flag by name. Text fields and unknown names
    /// return `None`.
    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.field(name) {
            Some(FieldValue::Bool(b)) => Some(b),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_record_values() {
        let record = ReferenceRecord::fallback();
        assert_eq!(record.agent_name, "John Smith");
        assert_eq!(record.customer_name, "Robert Williams");
        assert_eq!(record.company_name, "AnyCompany Financial");
        assert_eq!(record.customer_state, "TX");
        assert!(!record.do_not_call);
        assert!(!record.attorney_retained);
        assert!(record.expected_violations.is_empty());
    }

    #[test]
    fn test_field_lookup() {
        let mut record = ReferenceRecord::fallback();
        record.do_not_call = true;
        assert_eq!(record.field("do_not_call"), Some(FieldValue::Bool(true)));
        assert_eq!(record.field("state"), Some(FieldValue::Text("TX")));
        assert_eq!(record.field("customer_state"), Some(FieldValue::Text("TX")));
        assert_eq!(record.field("no_such_field"), None);
        assert_eq!(record.flag("do_not_call"), Some(true));
        assert_eq!(record.flag("state"), None);
    }

    #[test]
    fn test_derived_flags_from_raw_lists() {
        let record = ReferenceRecord::from_raw_lists(
            &["Sarah Johnson".to_string()],
            &[],
            &["AnyCompany Servicing".to_string()],
            &["attorney retained".to_string(), "Cease and desist".to_string()],
            &["Massachusetts".to_string()],
            vec!["LO1005.01".to_string(), "DNC-201".to_string()],
        );
        assert_eq!(record.agent_name, "Sarah Johnson");
        // Missing customer list falls back to the default name.
        assert_eq!(record.customer_name, "Robert Williams");
        assert_eq!(record.customer_state, "Massachusetts");
        assert!(record.attorney_retained);
        assert!(record.cease_and_desist);
        assert!(!record.bankruptcy_filed);
        assert!(record.do_not_call);
    }

    #[test]
    fn test_agent_first_name() {
        let record = ReferenceRecord::fallback();
        assert_eq!(record.agent_first_name(), "John");
        let empty = ReferenceRecord::default();
        assert_eq!(empty.agent_first_name(), "");
    }
}
