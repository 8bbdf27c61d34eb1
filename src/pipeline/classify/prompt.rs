//! Prompt contracts for the external inference capability.
//!
//! Both contracts demand strict JSON so responses can be parsed
//! defensively: anything outside the contract is a classifier failure,
//! never a guessed label.

pub const RISK_SYSTEM_PROMPT: &str = r#"
You are a contract-risk reviewer for non-lawyers. You are given one clause
from a legal document and you rate how risky it is for the party who
uploaded the document.

RULES — ABSOLUTE, NO EXCEPTIONS:
1. Judge ONLY the clause you are given, in isolation.
2. "Low" means standard boilerplate with no unusual exposure.
3. "Medium" means the clause deserves a careful read or negotiation.
4. "High" means the clause creates serious one-sided risk (unlimited
   liability, unilateral termination, hidden fees, waiver of rights).
5. The explanation must be one or two plain-language sentences a
   non-lawyer can act on.
6. Output MUST be a single JSON object and nothing else.

OUTPUT FORMAT:
{"risk": "Low" | "Medium" | "High", "explanation": "<plain-language reason>"}
"#;

/// Build the per-chunk risk prompt.
pub fn build_risk_prompt(clause_text: &str) -> String {
    format!(
        r#"<clause>
{clause_text}
</clause>

Rate the risk of the above clause and explain why.

{{"risk": "Low" | "Medium" | "High", "explanation": "..."}}"#
    )
}

pub const LEGITIMACY_SYSTEM_PROMPT: &str = r#"
You decide whether uploaded text is a legal or contractual document
(contract, agreement, terms of service, policy, deed, or similar).
Recipes, photos, fiction, invoices without terms, and random text are NOT
legal documents.

Output MUST be a single JSON object and nothing else:
{"is_legal": true | false, "reason": "<one sentence for the uploader>"}
"#;

/// Build the legitimacy-gate prompt over a leading sample of the document.
pub fn build_legitimacy_prompt(sample_text: &str) -> String {
    format!(
        r#"<document_sample>
{sample_text}
</document_sample>

Is the above the beginning of a legal or contractual document?

{{"is_legal": true | false, "reason": "..."}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_prompt_embeds_clause() {
        let prompt = build_risk_prompt("The supplier may terminate at any time.");
        assert!(prompt.contains("<clause>"));
        assert!(prompt.contains("The supplier may terminate at any time."));
        assert!(prompt.contains("\"risk\""));
    }

    #[test]
    fn legitimacy_prompt_embeds_sample() {
        let prompt = build_legitimacy_prompt("This Services Agreement is entered into...");
        assert!(prompt.contains("<document_sample>"));
        assert!(prompt.contains("Services Agreement"));
        assert!(prompt.contains("\"is_legal\""));
    }

    #[test]
    fn system_prompts_state_the_output_contract() {
        assert!(RISK_SYSTEM_PROMPT.contains("\"risk\""));
        assert!(LEGITIMACY_SYSTEM_PROMPT.contains("\"is_legal\""));
    }
}
