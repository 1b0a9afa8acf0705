use crate::vocab::parser::Entry;

/// Upper bound on context sentences per fill-in-the-blank question.
pub const MAX_SENTENCES: u32 = 99;

/// Parse a sentence count, accepting only whole numbers in
/// `1..=MAX_SENTENCES`.
pub fn parse_sentence_count(raw: &str) -> Option<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|n| (1..=MAX_SENTENCES).contains(n))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuestionType {
    /// 빈칸 추론: pick the word that fills the blank in every context sentence.
    FillInBlank,
    /// 영영풀이: pick the word matching an English definition.
    EnglishDefinition,
    /// 뜻풀이 판단: pick the correct English definition for a word.
    DefinitionJudgement,
}

impl QuestionType {
    pub const ALL: [QuestionType; 3] = [
        QuestionType::FillInBlank,
        QuestionType::EnglishDefinition,
        QuestionType::DefinitionJudgement,
    ];

    pub fn id(self) -> &'static str {
        match self {
            QuestionType::FillInBlank => "빈칸 추론",
            QuestionType::EnglishDefinition => "영영풀이",
            QuestionType::DefinitionJudgement => "뜻풀이 판단",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|qt| qt.id() == id)
    }

    /// Only the fill-in-the-blank template takes a context sentence count.
    pub fn needs_sentence_count(self) -> bool {
        matches!(self, QuestionType::FillInBlank)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompts {
    pub instructions: String,
    pub payload: String,
}

const PERSONA: &str = "You are an expert English vocabulary test maker for Korean students.";

const POLYSEMY_RULES: [&str; 3] = [
    "### Word Selection & Question Style Rule",
    "1. PRIORITY: Focus on polysemous words—those with multiple, distinct meanings (e.g., different parts of speech like 'conduct' as a noun vs. verb, or different senses like 'bank' of a river vs. a financial institution).",
    "2. GOAL: The questions should be intentionally challenging, designed to confuse the test-taker and test their ability to discern the correct meaning from context.",
];

const ANSWER_KEY_RULE: &str = "1. CRITICAL: DO NOT mark the correct answer in the choices. Instead, create a separate `[정답]` section at the very end of the entire output, listing each question number and its correct choice number.";

const DISTRIBUTION_RULE: &str = "2. CRITICAL: The position of the correct answer MUST be truly and unpredictably randomized to ensure a balanced distribution. For the entire set of questions, each choice position (①, ②, ③, ④, ⑤) should be the correct answer approximately 20% of the time. DO NOT use any discernible pattern (e.g., 1, 2, 3, 4, 5 or 5, 4, 3, 2, 1). The sequence of correct answers must appear random and chaotic.";

const FINAL_REVIEW_RULE: &str = "### Final Review\nBefore concluding your response, you MUST review the entire generated text one last time to ensure every single rule has been followed. Pay special attention that every question has exactly 5 numbered choices (① to ⑤). If you find any mistake, you must correct it before finishing.";

const PAYLOAD_HEADER: &str = "Here is the list of vocabulary. Create test questions based on these words, strictly following all rules defined in the system instructions.";

/// Build the system instructions and the user payload for one generation.
///
/// `sentences` is only interpolated into the fill-in-the-blank template.
pub fn build_prompts(entries: &[Entry], question_type: QuestionType, sentences: u32) -> Prompts {
    Prompts {
        instructions: instructions(question_type, sentences),
        payload: payload(entries),
    }
}

fn instructions(question_type: QuestionType, sentences: u32) -> String {
    let (task, main_rule, structure): (&str, &str, Vec<String>) = match question_type {
        QuestionType::FillInBlank => (
            "Your task is to create multiple-choice questions that test understanding of words in context.",
            "For each WORD and for each of its SENSEs, you must generate a complete question block.",
            vec![
                "2. Add the title: '다음 빈칸에 공통으로 들어갈 말로 가장 적절한 것은?'".to_string(),
                format!(
                    "3. Provide exactly {sentences} distinct English sentences as context. Each sentence must have the word blanked out as '_______'."
                ),
                "4. Provide exactly 5 answer choices (①, ②, ③, ④, ⑤).".to_string(),
                "5. The choices must include one correct answer (the original WORD) and four plausible but incorrect distractors.".to_string(),
                "6. Separate each full question block with a '---' line.".to_string(),
            ],
        ),
        QuestionType::EnglishDefinition => (
            "Your task is to create multiple-choice questions based on English definitions.",
            "For each WORD, you must generate one complete multiple-choice question.",
            vec![
                "2. Add the title: '다음 영어 설명에 해당하는 단어는?'".to_string(),
                "3. Provide the English definition of the WORD as the question body.".to_string(),
                "4. Provide exactly 5 answer choices (①, ②, ③, ④, ⑤): one correct answer (the original WORD) and four plausible distractors (e.g., synonyms, related words).".to_string(),
                "5. Separate each full question block with a '---' line.".to_string(),
            ],
        ),
        QuestionType::DefinitionJudgement => (
            "Your task is to create multiple-choice questions that test the precise definition of a word.",
            "For each WORD, you must generate one complete multiple-choice question asking for its correct definition.",
            vec![
                "2. Add the title: '다음 단어 <WORD>의 영영풀이로 가장 적절한 것은?' (replace <WORD> with the actual word).".to_string(),
                "3. Provide exactly 5 definition choices (①, ②, ③, ④, ⑤): one perfectly correct definition and four subtly incorrect but plausible definitions.".to_string(),
                "4. Separate each full question block with a '---' line.".to_string(),
            ],
        ),
    };

    let mut lines: Vec<String> = vec![
        PERSONA.to_string(),
        task.to_string(),
        "Strictly follow all rules below.".to_string(),
        String::new(),
        "### Main Rule".to_string(),
        main_rule.to_string(),
        String::new(),
    ];
    lines.extend(POLYSEMY_RULES.iter().map(|s| s.to_string()));
    lines.push(String::new());
    lines.push("### Answer Generation Rules".to_string());
    lines.push(ANSWER_KEY_RULE.to_string());
    lines.push(DISTRIBUTION_RULE.to_string());
    lines.push(String::new());
    lines.push("### Output Structure (per question)".to_string());
    lines.push("1. Start with the question number (e.g., '1.').".to_string());
    lines.extend(structure);
    lines.push(String::new());
    lines.push(FINAL_REVIEW_RULE.to_string());
    lines.join("\n")
}

fn payload(entries: &[Entry]) -> String {
    let listed: Vec<String> = entries.iter().map(Entry::to_line).collect();
    [
        PAYLOAD_HEADER.to_string(),
        String::new(),
        "[Vocabulary List]".to_string(),
        listed.join("\n"),
    ]
    .join("\n")
}
