//! Prompt templates for the research agents

use crate::domain::research::{ChatPrompt, InformationStrip, LegalDomain, Passage};

const ROUTER_SYSTEM_PROMPT: &str = "당신은 사용자의 법률 질문을 분석하여 적절한 검색 도구를 선택하는 AI 어시스턴트입니다.
다음 규칙에 따라 하나 이상의 도구를 선택하세요.
- 개인정보 보호법의 특정 조항에 대한 질문은 search_personal 도구를 사용하세요.
- 근로기준법의 특정 조항에 대한 질문은 search_labor 도구를 사용하세요.
- 주택임대차보호법의 특정 조항에 대한 질문은 search_housing 도구를 사용하세요.
- 일반적인 질문이나 최신 정보가 필요한 질문은 search_web 도구를 사용하세요.
- 특정 조항이 아닌 경우에는 관련 법률 검색 도구와 search_web 도구를 모두 사용하세요.";

const FINAL_ANSWER_SYSTEM_PROMPT: &str = "당신은 법률 전문가입니다. 여러 출처의 정보를 종합하여 질문에 대한 최종 답변을 마크다운 형식으로 작성하세요.
- 제공된 문서의 정보만을 사용하세요. 절대 지어내지 마세요.
- 각 정보의 출처를 문장 끝에 명확히 표기하세요. 예: (출처: 법률명 제X조) 또는 (출처: 웹사이트명, URL)
- 제공된 정보로 답할 수 없는 부분은 정보가 없다고 명시하세요.";

/// Placeholder rendered when a domain gathered no evidence
pub const NO_EVIDENCE: &str = "(추출된 정보 없음)";

pub fn router_prompt(question: &str) -> ChatPrompt {
    ChatPrompt::new(ROUTER_SYSTEM_PROMPT, question)
}

pub fn extraction_prompt(domain: LegalDomain, question: &str, passage: &Passage) -> ChatPrompt {
    let system = format!(
        "당신은 {}입니다. 주어진 문서에서 질문과 관련된 주요 사실과 정보를 3~5개 정도 추출하세요. \
         각 정보에 대해 관련성과 충실성을 0에서 1 사이의 점수로 평가하고, \
         최종적으로 질문에 대한 답변 가능성 점수를 평가하세요.",
        domain.expert_name()
    );
    let user = format!("[질문]\n{}\n\n[문서 내용]\n{}", question, passage.text);

    ChatPrompt::new(system, user)
}

pub fn refine_prompt(domain: LegalDomain, question: &str, evidence_summary: &str) -> ChatPrompt {
    let system = format!(
        "당신은 {}입니다. 주어진 원래 질문과 추출된 정보를 바탕으로 더 관련성 있고 \
         구체적인 정보를 찾기 위해 검색 쿼리를 개선해주세요. \
         가장 효과적일 것 같은 쿼리 하나와 그 이유를 제시하세요.",
        domain.expert_name()
    );
    let summary = if evidence_summary.trim().is_empty() {
        NO_EVIDENCE
    } else {
        evidence_summary
    };
    let user = format!("원래 질문: {}\n\n추출된 정보:\n{}", question, summary);

    ChatPrompt::new(system, user)
}

pub fn domain_answer_prompt(
    domain: LegalDomain,
    question: &str,
    evidence: &[InformationStrip],
) -> ChatPrompt {
    let system = format!(
        "당신은 {expert}입니다. 주어진 정보를 바탕으로 질문에 대한 답변을 작성하세요.
- 마크다운 형식으로 작성하며, 각 정보의 출처를 명확히 표시하세요. 예: (출처: {law} 제15조)
- 추출된 정보만 사용하고 지어내지 마세요.
- 추출된 정보가 없으면 관련 정보를 찾을 수 없었다고 명시하세요.",
        expert = domain.expert_name(),
        law = domain.law_name()
    );
    let user = format!(
        "질문: {}\n\n추출된 정보:\n{}",
        question,
        render_evidence(evidence)
    );

    ChatPrompt::new(system, user)
}

pub fn final_answer_prompt(question: &str, domain_answers: &[String]) -> ChatPrompt {
    let user = format!(
        "다음 정보를 바탕으로 질문에 답변하세요:\n\n[정보]\n{}\n\n[질문]\n{}",
        domain_answers.join("\n\n"),
        question
    );

    ChatPrompt::new(FINAL_ANSWER_SYSTEM_PROMPT, user)
}

/// One block per strip: `내용: {content}\n출처: {source}`
pub fn render_evidence(evidence: &[InformationStrip]) -> String {
    if evidence.is_empty() {
        return NO_EVIDENCE.to_string();
    }

    evidence
        .iter()
        .map(|strip| format!("내용: {}\n출처: {}", strip.content, strip.source))
        .collect::<Vec<_>>()
        .join("\n\n")
}
