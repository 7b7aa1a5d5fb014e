//! Fixed analysis prompt shared by every vision backend.

/// The prompt sent with every photograph.
///
/// Backends are asked for a bare JSON object; [`parse_critique`](super::parse_critique)
/// still tolerates markdown fences because not every model complies.
pub fn critique_prompt() -> &'static str {
    CRITIQUE_PROMPT
}

const CRITIQUE_PROMPT: &str = r#"You are an expert photography critic and retoucher. Analyze this photograph and respond in STRICT JSON format only.

Your response must be ONLY a valid JSON object with no additional text, markdown formatting, or explanations.

Provide exactly this structure:
{
  "score": <number 0-100>,
  "genre": "portrait | landscape | street | wildlife | macro | architecture | product | other",
  "subject": "short description of the main subject",
  "mood": "the intended mood or atmosphere",
  "technical_assessment": {
    "exposure": "assessment",
    "color": "assessment",
    "sharpness": "assessment",
    "composition": "assessment"
  },
  "preserve": ["element that must not be altered", "..."],
  "improvements": [
    {
      "action": "specific, actionable editing instruction",
      "intensity": "subtle | moderate | significant",
      "priority": <integer, 1 = most important>,
      "reason": "why this improves the photograph"
    }
  ],
  "notes": "brief explanation of the score and why these improvements matter"
}

Guidelines for your analysis:
- score: Rate the overall quality (composition, lighting, exposure, colors, subject clarity)
- improvements: List 2-5 SPECIFIC, ACTIONABLE image editing instructions (e.g., "increase brightness in the shadows", "boost vibrance in the blue tones", "reduce the warm color cast")
- Only suggest edits a retoucher can apply to THIS photograph: never add or remove objects, never change who or what is depicted
- preserve: List the elements that define the photograph and must survive editing
- notes: Brief reasoning (2-3 sentences max)

CRITICAL: Output ONLY the JSON object. No markdown, no code blocks, no additional text."#;
