use rand::seq::IndexedRandom;
use rand::Rng;

use crate::config::PromptTemplates;
use crate::pipelines::sentiment::SentimentLabel;

/// Turns a user prompt and a sentiment into the instruction actually sent
/// to the generator:
///
/// ```text
/// <prefix><user prompt>. This is <style word>.
/// ```
#[derive(Debug, Clone, Default)]
pub struct PromptComposer {
    templates: PromptTemplates,
}

impl PromptComposer {
    pub fn new(templates: PromptTemplates) -> Self {
        Self { templates }
    }

    pub fn templates(&self) -> &PromptTemplates {
        &self.templates
    }

    /// Compose the enhanced prompt. The style word is drawn uniformly from
    /// the template's list using `rng`.
    pub fn compose<R: Rng + ?Sized>(
        &self,
        user_prompt: &str,
        sentiment: SentimentLabel,
        rng: &mut R,
    ) -> String {
        let template = self.templates.get(sentiment);

        let mut enhanced = format!("{}{user_prompt}. ", template.prefix);
        if let Some(style_word) = template.style_words.choose(rng) {
            enhanced.push_str(&format!("This is {style_word}. "));
        }
        enhanced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn compose_follows_template_shape() {
        let composer = PromptComposer::default();
        let mut rng = StdRng::seed_from_u64(1);

        let prompt = composer.compose("traffic jams", SentimentLabel::Negative, &mut rng);
        let template = &composer.templates().negative;

        assert!(prompt.starts_with("Write a critical and negative text about: traffic jams. "));
        assert!(prompt.ends_with(". "));
        assert!(template
            .style_words
            .iter()
            .any(|w| prompt.ends_with(&format!("This is {w}. "))));
    }

    #[test]
    fn same_seed_same_prompt() {
        let composer = PromptComposer::default();
        let a = composer.compose("x", SentimentLabel::Positive, &mut StdRng::seed_from_u64(9));
        let b = composer.compose("x", SentimentLabel::Positive, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn style_words_all_reachable() {
        let composer = PromptComposer::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(composer.compose("x", SentimentLabel::Neutral, &mut rng));
        }
        assert_eq!(seen.len(), composer.templates().neutral.style_words.len());
    }

    #[test]
    fn empty_style_list_omits_style_sentence() {
        let mut templates = PromptTemplates::default();
        templates.positive.style_words.clear();
        let composer = PromptComposer::new(templates);

        let prompt = composer.compose("cats", SentimentLabel::Positive, &mut StdRng::seed_from_u64(0));
        assert_eq!(prompt, "Write an uplifting and positive text about: cats. ");
    }
}
