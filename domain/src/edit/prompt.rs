//! Edit prompt assembly.

use super::guidelines::genre_guidelines;
use super::intensity::EditAction;
use crate::critique::CritiqueContext;

/// Position of one pass within a multi-pass edit (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassInfo {
    pub index: usize,
    pub total: usize,
}

impl PassInfo {
    pub fn single() -> Self {
        Self { index: 1, total: 1 }
    }
}

const EDITING_PRINCIPLES: &str = "\
EDITING PRINCIPLES:

1. HARD CONSTRAINTS:
   - Never add or remove objects, people, or scene elements
   - Never change the identity of people or the genre of the photograph
   - Never introduce artifacts, halos, banding, or posterization

2. INTENSITY GUIDE (indicated in brackets):
   - [SUBTLE] = Minor refinement, barely noticeable (5-15% adjustment)
   - [MODERATE] = Clear improvement, still natural (15-30% adjustment)
   - [SIGNIFICANT] = Strong correction needed (30-50% adjustment)

3. TECHNICAL STANDARDS:
   - Maintain natural color relationships, avoid oversaturation or color casts
   - Preserve detail in highlights and shadows, no clipping
   - Keep noise levels appropriate to the image
   - Ensure smooth tonal gradations without banding
   - Maintain sharpness without halos or artifacts
   - The edit should look professional but not over-processed";

/// Build the prompt for one edit pass.
pub fn build_edit_prompt(
    actions: &[EditAction],
    context: Option<&CritiqueContext>,
    pass: PassInfo,
) -> String {
    let mut prompt = String::from(
        "You are a professional photo retoucher applying targeted edits to enhance this \
         photograph. Make precise, natural adjustments that improve the image while \
         respecting its artistic intent.\n\n",
    );

    if pass.total > 1 {
        prompt.push_str(&format!(
            "PASS {} OF {}: apply only the edits listed below; earlier passes already \
             handled other adjustments.\n\n",
            pass.index, pass.total
        ));
    }

    if let Some(ctx) = context {
        let section = context_section(ctx);
        if !section.is_empty() {
            prompt.push_str("IMAGE CONTEXT:\n");
            prompt.push_str(&section);
            prompt.push('\n');
        }
    }

    prompt.push_str("REQUESTED EDITS:\n");
    for (i, action) in actions.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, action));
    }
    prompt.push('\n');

    if let Some(ctx) = context
        && !ctx.preserve.is_empty()
    {
        prompt.push_str("PRESERVE THESE ELEMENTS (do not alter):\n");
        for item in &ctx.preserve {
            prompt.push_str(&format!("- {}\n", item));
        }
        prompt.push('\n');
    }

    prompt.push_str(EDITING_PRINCIPLES);
    prompt.push_str("\n\n");
    prompt.push_str(genre_guidelines(context.map(|c| c.genre.as_str())));
    prompt.push_str(
        "\n\nGenerate the enhanced version of this photograph with the requested edits applied.",
    );

    prompt
}

fn context_section(ctx: &CritiqueContext) -> String {
    let mut lines = Vec::new();
    if ctx.has_known_genre() {
        lines.push(format!("- Genre: {} photography", ctx.genre));
    }
    if !ctx.subject.is_empty() {
        lines.push(format!("- Subject: {}", ctx.subject));
    }
    if !ctx.mood.is_empty() {
        lines.push(format!("- Intended mood: {}", ctx.mood));
    }
    let technical: Vec<String> = ctx
        .technical
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect();
    if !technical.is_empty() {
        lines.push(format!("- Technical assessment: {}", technical.join(", ")));
    }

    lines.iter().map(|l| format!("{}\n", l)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::intensity::Intensity;

    fn actions() -> Vec<EditAction> {
        vec![
            EditAction::new("Lift shadows", Intensity::Subtle),
            EditAction::new("Boost contrast", Intensity::Moderate),
        ]
    }

    #[test]
    fn test_numbered_actions() {
        let prompt = build_edit_prompt(&actions(), None, PassInfo::single());
        assert!(prompt.contains("1. [SUBTLE] Lift shadows\n"));
        assert!(prompt.contains("2. [MODERATE] Boost contrast\n"));
        assert!(prompt.contains("GENERAL GUIDELINES"));
        assert!(!prompt.contains("IMAGE CONTEXT"));
        assert!(!prompt.contains("PASS "));
    }

    #[test]
    fn test_context_and_preserve() {
        let mut ctx = CritiqueContext {
            genre: "portrait".into(),
            subject: "an old fisherman".into(),
            mood: "weathered".into(),
            preserve: vec!["beard texture".into()],
            ..Default::default()
        };
        ctx.technical.insert("exposure".into(), "slightly under".into());

        let prompt = build_edit_prompt(&actions(), Some(&ctx), PassInfo::single());
        assert!(prompt.contains("- Genre: portrait photography"));
        assert!(prompt.contains("- Subject: an old fisherman"));
        assert!(prompt.contains("- Intended mood: weathered"));
        assert!(prompt.contains("- Technical assessment: exposure: slightly under"));
        assert!(prompt.contains("PRESERVE THESE ELEMENTS"));
        assert!(prompt.contains("- beard texture"));
        assert!(prompt.contains("PORTRAIT-SPECIFIC"));
    }

    #[test]
    fn test_unknown_genre_omitted_from_context() {
        let ctx = CritiqueContext {
            subject: "a bridge".into(),
            ..Default::default()
        };
        let prompt = build_edit_prompt(&actions(), Some(&ctx), PassInfo::single());
        assert!(!prompt.contains("Genre:"));
        assert!(prompt.contains("- Subject: a bridge"));
        assert!(!prompt.contains("PRESERVE"));
    }

    #[test]
    fn test_pass_header() {
        let prompt = build_edit_prompt(&actions(), None, PassInfo { index: 2, total: 3 });
        assert!(prompt.contains("PASS 2 OF 3"));
    }

    #[test]
    fn test_principles_present() {
        let prompt = build_edit_prompt(&actions(), None, PassInfo::single());
        assert!(prompt.contains("Never add or remove objects"));
        assert!(prompt.contains("(5-15% adjustment)"));
        assert!(prompt.contains("(30-50% adjustment)"));
    }
}
