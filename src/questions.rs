use async_trait::async_trait;
use tracing::info;

use crate::models::GeneratedQuestion;

#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(&self, text: &str, count: usize, kind: &str) -> Vec<GeneratedQuestion>;
}

/// Placeholder generator: returns up to `count` entries from a fixed pool of
/// three, regardless of the text or requested kind. Output carries no meaning.
#[derive(Clone, Copy, Debug, Default)]
pub struct StubQuestionGenerator;

fn fixed_pool() -> [GeneratedQuestion; 3] {
    let opts = |v: &[&str]| Some(v.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    [
        GeneratedQuestion {
            question: "What is the main topic discussed in the text?".into(),
            options: opts(&["Topic A", "Topic B", "Topic C", "Topic D"]),
            answer: Some("Topic B".into()),
        },
        GeneratedQuestion {
            question: "Summarize the key takeaway in one sentence.".into(),
            options: None,
            answer: Some("The key takeaway is about X.".into()),
        },
        GeneratedQuestion {
            question: "Who is the author of this note?".into(),
            options: opts(&["Author 1", "Author 2", "Author 3"]),
            answer: Some("Author 1".into()),
        },
    ]
}

#[async_trait]
impl QuestionGenerator for StubQuestionGenerator {
    async fn generate(&self, text: &str, count: usize, kind: &str) -> Vec<GeneratedQuestion> {
        info!(count = count, kind = %kind, text_len = text.len(), "generating questions (stub)");
        fixed_pool().into_iter().take(count).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn count_is_capped_at_pool_size() {
        let q = StubQuestionGenerator.generate("text", 10, "multiple_choice").await;
        assert_eq!(q.len(), 3);
    }

    #[tokio::test]
    async fn single_question_is_the_first_entry() {
        let q = StubQuestionGenerator.generate("text", 1, "short_answer").await;
        assert_eq!(q.len(), 1);
        assert_eq!(q[0].question, "What is the main topic discussed in the text?");
        assert_eq!(q[0].answer.as_deref(), Some("Topic B"));
    }

    #[tokio::test]
    async fn kind_and_text_do_not_change_output() {
        let a = StubQuestionGenerator.generate("alpha", 2, "multiple_choice").await;
        let b = StubQuestionGenerator.generate("beta", 2, "short_answer").await;
        assert_eq!(a, b);
        assert!(a[1].options.is_none());
        assert!(StubQuestionGenerator.generate("x", 0, "x").await.is_empty());
    }
}
