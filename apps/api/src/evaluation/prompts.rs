// All LLM prompt constants for the Evaluation module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Shared output contract. Every evaluation prompt ends with this block.
pub const OUTPUT_SCHEMA: &str = r#"Return ONLY a valid JSON object with this exact structure:
{
  "match_score": <integer 0-100>,
  "missing_keywords": [<array of missing keywords>],
  "strengths": [<array of strengths>],
  "weaknesses": [<array of weaknesses>]
}"#;

/// Text-mode prompt. Replace `{job_description}`, `{resume_text}`,
/// `{semantic_hint}`, `{output_schema}` and `{json_only}` before sending.
pub const TEXT_EVALUATION_TEMPLATE: &str = r#"You are an expert ATS (Applicant Tracking System) resume evaluator. Analyze the provided resume text against the given job description and provide a comprehensive evaluation.

JOB DESCRIPTION:
{job_description}

RESUME TEXT:
{resume_text}
{semantic_hint}
{output_schema}

{json_only}"#;

/// Optional hint block. Replace `{semantic_score}`.
pub const SEMANTIC_HINT_TEMPLATE: &str = "
SEMANTIC SIMILARITY:
An embedding model rated the semantic similarity between this resume and the job description at {semantic_score}/100. Treat it as a signal, not a verdict.
";

/// Vision-mode prompt. The résumé travels as an inline PDF part.
/// Replace `{job_description}`, `{output_schema}` and `{json_only}`.
pub const VISION_EVALUATION_TEMPLATE: &str = r#"You are an expert ATS resume evaluator. Analyze the attached resume document against the job description below.

JOB DESCRIPTION:
{job_description}

{output_schema}

{json_only}"#;
