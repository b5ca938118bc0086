// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed prompt and reply texts.

/// Persona used when no prompt is configured.
pub const DEFAULT_PERSONA: &str = "당신은 사용자를 기억하는 AI 어시스턴트입니다.
제공된 사용자 정보와 과거 기억을 바탕으로 개인화된 대화를 진행하세요.

중요 지침:
1. 사용자에 대해 알고 있는 정보를 자연스럽게 대화에 활용하세요
2. 이전에 나눈 대화나 정보를 기억하고 있음을 보여주세요
3. 사용자의 선호도를 고려하여 답변하세요
4. 모순된 정보가 있다면 최신 정보를 우선시하세요
5. 한국어로 친근하게 대화하세요";

/// Reply sent when the gateway cannot produce one.
pub const GATEWAY_APOLOGY: &str = "죄송합니다. 응답을 생성하는 중 문제가 발생했습니다.";

/// Reply sent when the turn itself fails.
pub const TURN_APOLOGY: &str = "죄송합니다. 일시적인 오류가 발생했습니다.";

/// Wraps a memory context block in the instructions sent with it.
pub fn memory_context_message(context: &str) -> String {
    format!(
        "다음은 사용자에 대해 기억하고 있는 정보입니다:\n\n{context}\n\n\
         위 정보를 참고하여 대화하되, 너무 인위적으로 언급하지 마세요.\n\
         자연스럽게 대화 흐름에 맞춰 활용하세요."
    )
}
