//! Prompt templates for the four claim task families.
//!
//! Every template that carries claim facts takes already-redacted text;
//! the analyzer is responsible for redacting before calling in here.
//! Schema hints are shared between the initial prompt and the repair
//! instruction so the model is always shown the same contract.

use chrono::{Duration as ChronoDuration, Utc};
use claimpilot_core::{ClaimInvestigationRequest, FileNoteRequest, TaskType};

/// Task-specific system prompt.
pub fn system_prompt(task: TaskType) -> &'static str {
    match task {
        TaskType::ClaimTriage => {
            "You are an expert insurance claims analyst specializing in claim triage and classification.\n\
             Your role is to analyze First Notice of Loss (FNOL) information and provide structured investigation guidance.\n\
             Be thorough, professional, and focus on actionable insights that help claims handlers efficiently investigate claims.\n\
             Always consider coverage implications, liability factors, and potential red flags."
        }
        TaskType::QuestionGeneration => {
            "You are an experienced claims investigator who specializes in developing comprehensive interview questions.\n\
             Generate investigation questions that help uncover liability, assess damages, and identify coverage issues.\n\
             Questions should be clear, non-leading, and designed to elicit detailed responses.\n\
             Consider the specific claim type and tailor questions appropriately."
        }
        TaskType::CoverageAnalysis => {
            "You are a coverage specialist with expertise in insurance policy analysis.\n\
             Analyze claims against policy terms to identify coverage issues, exclusions, and conditions.\n\
             Highlight potential coverage defenses, late notice issues, and other red flags.\n\
             Provide clear, actionable guidance while noting this is for educational purposes only."
        }
        TaskType::FileNotes => {
            "You are a senior claims professional who writes excellent file documentation.\n\
             Create a clear, professional file note that documents investigation activities, findings, and next steps.\n\
             Notes should be concise yet comprehensive, suitable for regulatory review.\n\
             Follow best practices for claims documentation."
        }
    }
}

/// JSON contract shown to the model for each task; also used verbatim in
/// the repair instruction.
pub fn schema_hint(task: TaskType) -> &'static str {
    match task {
        TaskType::ClaimTriage => {
            r#"{
    "triage": {
        "claim_type": "auto_bi|auto_pd|gl|wc|property|professional",
        "confidence": 0.0-1.0,
        "severity_assessment": "string describing severity",
        "complexity_rating": "simple|moderate|complex",
        "recommended_handler_level": "junior|standard|senior|specialist",
        "key_concerns": ["list", "of", "concerns"]
    },
    "immediate_tasks": [
        {
            "task": "task description",
            "priority": "high|medium|low",
            "deadline_guidance": "within 24 hours",
            "category": "contact|document|review|legal|medical",
            "notes": "optional notes"
        }
    ],
    "short_term_tasks": [],
    "ongoing_tasks": [],
    "documents_to_request": ["list of documents"],
    "parties_to_contact": [
        {"party": "Claimant", "reason": "Obtain recorded statement", "priority": "high"}
    ]
}"#
        }
        TaskType::QuestionGeneration => {
            r#"{
    "party_type": "claimant|witness|insured|employer",
    "liability_questions": ["Question about liability/fault"],
    "damages_questions": ["Question about damages/injuries"],
    "coverage_questions": ["Question about coverage red flags"],
    "follow_up_triggers": [
        {"if": "response condition", "then": "follow-up question"}
    ]
}"#
        }
        TaskType::CoverageAnalysis => {
            r#"{
    "coverage_status": "confirmed|pending|issue_identified|denied",
    "coverage_issues": [
        {
            "issue_type": "coverage",
            "description": "description of issue",
            "severity": "high|medium|low",
            "action_required": "what to do",
            "questions_to_resolve": ["questions to answer"]
        }
    ],
    "liability_issues": [],
    "key_coverage_points": ["points to confirm with policy"],
    "key_liability_questions": ["questions to resolve"],
    "red_flags": ["any red flags identified"],
    "recommended_reserves_range": "Initial reserve range suggestion or null"
}"#
        }
        TaskType::FileNotes => {
            r#"{
    "note_date": "YYYY-MM-DD",
    "claim_number": "claim number",
    "summary": "2-3 sentence executive summary",
    "detailed_notes": "Full detailed notes with all activities documented professionally",
    "action_plan": ["Next action item with target date"],
    "reserve_recommendation": "Reserve recommendation if applicable, or null",
    "follow_up_date": "YYYY-MM-DD"
}"#
        }
    }
}

/// Renders the FNOL working summary fed to triage and coverage prompts.
///
/// This text is the redaction input: it deliberately gathers every
/// free-text field in one place so a single redaction pass covers the
/// whole prompt.
pub fn fnol_summary(request: &ClaimInvestigationRequest) -> String {
    let fnol = &request.fnol;
    let policy = &request.policy;

    let mut summary = String::new();
    summary.push_str("FIRST NOTICE OF LOSS SUMMARY\n");
    summary.push_str("============================\n");
    summary.push_str(&format!("Date of Loss: {}\n", fnol.date_of_loss));
    summary.push_str(&format!(
        "Time of Loss: {}\n",
        fnol.time_of_loss.as_deref().unwrap_or("Not specified")
    ));
    summary.push_str(&format!("Location: {}\n", fnol.location));
    summary.push_str(&format!("Jurisdiction: {}\n\n", request.jurisdiction));

    summary.push_str("INCIDENT DESCRIPTION:\n");
    summary.push_str(&fnol.description);
    summary.push('\n');
    summary.push('\n');

    summary.push_str(&format!("REPORTED BY: {}\n", fnol.reported_by));
    summary.push_str(&format!("DATE REPORTED: {}\n\n", fnol.reported_date));

    summary.push_str(&format!(
        "INJURIES: {}\n",
        if fnol.injuries_reported { "Yes" } else { "No" }
    ));
    if let Some(details) = &fnol.injury_description {
        summary.push_str(&format!("Injury Details: {}\n", details));
    }
    summary.push_str(&format!(
        "PROPERTY DAMAGE: {}\n",
        if fnol.property_damage_reported {
            "Yes"
        } else {
            "No"
        }
    ));
    if let Some(details) = &fnol.property_damage_description {
        summary.push_str(&format!("Damage Details: {}\n", details));
    }
    summary.push('\n');

    summary.push_str(&format!("WITNESSES: {} reported\n", fnol.witnesses.len()));
    summary.push_str(&format!(
        "POLICE REPORT: {}\n\n",
        fnol.police_report_number
            .as_deref()
            .unwrap_or("Not available")
    ));

    summary.push_str("POLICY INFORMATION:\n");
    summary.push_str(&format!("- Policy Number: {}\n", policy.policy_number));
    summary.push_str(&format!(
        "- Effective: {} to {}\n",
        policy.effective_date, policy.expiration_date
    ));
    summary.push_str(&format!(
        "- Coverage Limits: {}\n",
        serde_json::Value::Object(policy.coverage_limits.clone())
    ));
    summary.push_str(&format!(
        "- Deductible: {}\n",
        policy
            .deductible
            .map(|d| format!("${d}"))
            .unwrap_or_else(|| "N/A".to_string())
    ));
    summary.push_str(&format!(
        "- Named Insureds: {}\n",
        policy.named_insureds.len()
    ));
    summary.push_str(&format!(
        "- Endorsements: {}\n\n",
        if policy.endorsements.is_empty() {
            "None".to_string()
        } else {
            policy.endorsements.join(", ")
        }
    ));

    summary.push_str("ADDITIONAL CONTEXT:\n");
    summary.push_str(
        request
            .additional_context
            .as_deref()
            .unwrap_or("None provided"),
    );
    summary.push('\n');

    summary
}

/// User prompt for claim triage. `redacted_summary` is the FNOL summary
/// after redaction.
pub fn triage_prompt(redacted_summary: &str, jurisdiction: &str) -> String {
    format!(
        "Analyze this insurance claim FNOL and provide a comprehensive investigation plan.\n\n\
         {redacted_summary}\n\n\
         Respond with ONLY a JSON object in exactly this format:\n{schema}\n\n\
         Be thorough and specific to this claim type and jurisdiction ({jurisdiction}).\n\
         Consider coverage implications and potential red flags.\n\
         Ensure tasks are actionable and prioritized appropriately.",
        schema = schema_hint(TaskType::ClaimTriage),
    )
}

/// Renders the question-generation input that gets redacted before
/// prompting. The summary and the caller-supplied issue list are gathered
/// into one text so a single redaction pass covers both.
pub fn question_input(claim_summary: &str, specific_issues: &[String]) -> String {
    let issues = if specific_issues.is_empty() {
        "None specified".to_string()
    } else {
        bulleted(specific_issues)
    };
    format!(
        "CLAIM SUMMARY:\n{claim_summary}\n\nSPECIFIC ISSUES TO ADDRESS:\n{issues}"
    )
}

/// User prompt for investigation question generation. `redacted_input` is
/// the [`question_input`] text after redaction.
pub fn question_prompt(redacted_input: &str, claim_type: &str, party_type: &str) -> String {
    format!(
        "Generate comprehensive investigation questions for a {party_type} in a {claim_type} claim.\n\n\
         {redacted_input}\n\n\
         Respond with ONLY a JSON object in exactly this format:\n{schema}\n\n\
         Questions should be:\n\
         - Clear and non-leading\n\
         - Specific to the claim type ({claim_type})\n\
         - Designed to elicit detailed responses\n\
         - Progressive (start broad, then specific)\n\
         Include at least 5 questions per category.",
        schema = schema_hint(TaskType::QuestionGeneration),
    )
}

/// User prompt for coverage and liability analysis.
pub fn coverage_prompt(redacted_summary: &str, jurisdiction: &str) -> String {
    format!(
        "Analyze this claim for coverage and liability issues.\n\n\
         {redacted_summary}\n\n\
         Respond with ONLY a JSON object in exactly this format:\n{schema}\n\n\
         Consider:\n\
         - Policy effective dates vs date of loss\n\
         - Coverage limits and deductibles\n\
         - Named insureds and drivers\n\
         - Exclusions and endorsements\n\
         - Comparative negligence ({jurisdiction} law)\n\
         - Late reporting issues\n\
         - Pre-existing conditions\n\n\
         This is for EDUCATIONAL/TRAINING purposes - actual coverage determinations require licensed adjusters.",
        schema = schema_hint(TaskType::CoverageAnalysis),
    )
}

/// Renders the raw file-note input that gets redacted before prompting.
pub fn file_note_input(request: &FileNoteRequest) -> String {
    let contacts = request
        .contact_summaries
        .iter()
        .map(|c| format!("- {}: {}", c.party, c.summary))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Claim: {}\nActions Completed:\n{}\nContacts:\n{}\nFindings:\n{}\nNext Steps:\n{}\n",
        request.claim_number,
        bulleted(&request.actions_completed),
        contacts,
        bulleted(&request.findings),
        bulleted(&request.next_steps),
    )
}

fn bulleted(items: &[String]) -> String {
    items
        .iter()
        .map(|i| format!("- {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// User prompt for file note / diary entry drafting.
pub fn file_note_prompt(redacted_input: &str) -> String {
    let today = Utc::now().date_naive();
    let follow_up = today + ChronoDuration::days(7);
    format!(
        "Generate a professional insurance claim file note (diary entry).\n\n\
         {redacted_input}\n\n\
         Respond with ONLY a JSON object in exactly this format:\n{schema}\n\n\
         Use \"{today}\" as note_date and \"{follow_up}\" as follow_up_date unless the input says otherwise.\n\
         The note should:\n\
         - Be professional and suitable for regulatory review\n\
         - Document WHO was contacted, WHAT was discussed, WHEN\n\
         - Include all relevant findings\n\
         - Have clear, prioritized next steps",
        schema = schema_hint(TaskType::FileNotes),
    )
}

/// Follow-up instruction sent once when the first response fails
/// validation.
pub fn repair_instruction(task: TaskType, reasons: &[String]) -> String {
    format!(
        "The previous output was invalid because: {}.\n\
         Reformat your answer strictly as a JSON object in exactly this format, with no prose or markdown around it:\n{}",
        reasons.join("; "),
        schema_hint(task),
    )
}
