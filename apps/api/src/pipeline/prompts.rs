// LLM prompt templates for the cover letter pipeline.
// Both builders substitute their inputs verbatim: no escaping, no truncation.

use crate::pipeline::parser::{END_MARKER, MISSING_KEYWORDS_MARKER, RESUME_SUGGESTIONS_MARKER};

/// Gap analysis template. Slots: {resume_text}, {job_description}, and the three markers.
pub const GAP_ANALYSIS_PROMPT_TEMPLATE: &str = r#"You are an expert resume analyst and career coach. Your task is to perform a gap analysis between a user's resume and a job description.

**Step 1: Identify Missing Keywords**
Compare the resume against the job description and identify 3-5 of the most critical skills, technologies, or qualifications present in the job description but MISSING from the resume.

**Step 2: Generate Resume Suggestions**
For EACH missing keyword you identified, create 2-3 specific, quantifiable, and action-oriented bullet points that the user could add to their resume. Frame these as if the user has the skills.

**Output Format (Strict):**
Provide your response using these exact separators.

{missing_marker}
- [Missing Keyword 1]
- [Missing Keyword 2]
- [and so on...]

{suggestions_marker}
**For [Missing Keyword 1]:**
- [Action-oriented bullet point 1]
- [Action-oriented bullet point 2]

**For [Missing Keyword 2]:**
- [Action-oriented bullet point 1]
- [Action-oriented bullet point 2]

{end_marker}

**INPUTS:**

**Resume Text:**
{resume_text}

**Job Description:**
{job_description}"#;

/// Cover letter template. Slots: {resume_text}, {job_description}, {missing_keywords}.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"You are an expert career strategist and professional copywriter. Your task is to write a compelling cover letter.

**Context:**
You are given a resume, a job description, and a list of important skills that are in the job description but were missing from the resume.

**Your Prime Directive:**
Write a professional and persuasive cover letter assuming the candidate **possesses** the "missing skills". Seamlessly and confidently integrate BOTH the skills demonstrated in the resume AND the provided "missing skills" into the narrative. The goal is to present the candidate as a perfect fit for the role.

**Formatting and Content Rules:**
- The letter should be 3-4 paragraphs long.
- Address it to "Dear Hiring Manager,".
- The tone must be confident and professional.
- **Paragraph 1:** State the position and express enthusiasm.
- **Paragraph 2 (Core):** Weave together achievements from the resume and the assumed "missing skills" to build a strong case. Use metrics and specific examples.
- **Paragraph 3:** Reiterate your fit and enthusiasm, and include a strong call to action.
- End with "Sincerely,".
- DO NOT use placeholders like "[Your Name]".

**INPUTS:**

**Resume Text:**
{resume_text}

**Job Description:**
{job_description}

**Assumed Skills (Missing from Resume but to be included in the letter):**
{missing_keywords}"#;

pub fn build_gap_analysis_prompt(resume_text: &str, job_description: &str) -> String {
    fill_template(
        GAP_ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("missing_marker", MISSING_KEYWORDS_MARKER),
            ("suggestions_marker", RESUME_SUGGESTIONS_MARKER),
            ("end_marker", END_MARKER),
            ("resume_text", resume_text),
            ("job_description", job_description),
        ],
    )
}

pub fn build_cover_letter_prompt(
    resume_text: &str,
    job_description: &str,
    missing_keywords: &str,
) -> String {
    fill_template(
        COVER_LETTER_PROMPT_TEMPLATE,
        &[
            ("resume_text", resume_text),
            ("job_description", job_description),
            ("missing_keywords", missing_keywords),
        ],
    )
}

/// Replaces `{name}` slots in a single left-to-right pass.
///
/// Substituted values are never rescanned, so user text containing `{job_description}`
/// lands in the prompt literally. Braces that do not form a known slot are kept.
fn fill_template(template: &str, slots: &[(&str, &str)]) -> String {
    let extra: usize = slots.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let slot = slots.iter().find(|(name, _)| {
            tail[1..]
                .strip_prefix(name)
                .is_some_and(|after| after.starts_with('}'))
        });
        match slot {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len() + 2..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "Jane Doe\nSkilled in Python.\n5 years experience.";
    const JD: &str = "Backend engineer. Required: Docker, Kubernetes, Python.";

    #[test]
    fn test_gap_prompt_embeds_inputs_verbatim() {
        let prompt = build_gap_analysis_prompt(RESUME, JD);
        assert!(prompt.contains("**Resume Text:**\nJane Doe\nSkilled in Python.\n5 years experience."));
        assert!(prompt.contains("**Job Description:**\nBackend engineer. Required: Docker, Kubernetes, Python."));
        assert!(!prompt.contains("{resume_text}"));
        assert!(!prompt.contains("{job_description}"));
    }

    #[test]
    fn test_gap_prompt_carries_markers_in_order() {
        let prompt = build_gap_analysis_prompt(RESUME, JD);
        let a = prompt.find(MISSING_KEYWORDS_MARKER).unwrap();
        let b = prompt.find(RESUME_SUGGESTIONS_MARKER).unwrap();
        let c = prompt.find(END_MARKER).unwrap();
        assert!(a < b && b < c);
        assert!(prompt.contains("3-5 of the most critical skills"));
        assert!(prompt.contains("2-3 specific, quantifiable, and action-oriented bullet points"));
    }

    #[test]
    fn test_cover_letter_prompt_embeds_all_three_inputs() {
        let prompt = build_cover_letter_prompt(RESUME, JD, "- Docker\n- Kubernetes");
        assert!(prompt.contains(RESUME));
        assert!(prompt.contains(JD));
        assert!(prompt.ends_with("**Assumed Skills (Missing from Resume but to be included in the letter):**\n- Docker\n- Kubernetes"));
    }

    #[test]
    fn test_cover_letter_prompt_fixes_salutation_and_closing() {
        let prompt = build_cover_letter_prompt(RESUME, JD, "");
        assert!(prompt.contains("\"Dear Hiring Manager,\""));
        assert!(prompt.contains("\"Sincerely,\""));
        assert!(prompt.contains("DO NOT use placeholders like \"[Your Name]\""));
        assert!(prompt.contains("3-4 paragraphs"));
    }

    #[test]
    fn test_builders_are_deterministic() {
        assert_eq!(
            build_gap_analysis_prompt(RESUME, JD),
            build_gap_analysis_prompt(RESUME, JD)
        );
        assert_eq!(
            build_cover_letter_prompt(RESUME, JD, "- Go"),
            build_cover_letter_prompt(RESUME, JD, "- Go")
        );
    }

    #[test]
    fn test_slot_lookalikes_in_input_are_not_resubstituted() {
        let resume = "I wrote {job_description} templates and {unknown} braces";
        let prompt = build_gap_analysis_prompt(resume, "JD BODY");
        assert!(prompt.contains("I wrote {job_description} templates and {unknown} braces"));
        assert_eq!(prompt.matches("JD BODY").count(), 1);
    }

    #[test]
    fn test_fill_template_keeps_unknown_and_unclosed_braces() {
        let out = fill_template("a {x} {y} {z", &[("x", "1")]);
        assert_eq!(out, "a 1 {y} {z");
    }

    #[test]
    fn test_long_inputs_pass_through_untruncated() {
        let long = "x".repeat(100_000);
        let prompt = build_cover_letter_prompt(&long, JD, "- Rust");
        assert!(prompt.contains(&long));
    }
}
