//! System-instruction assembly for the chat and analysis modes.
//!
//! Conditional sections are modeled as an ordered list of optional blocks
//! joined deterministically, so presence and relative order are testable
//! independently of the exact wording. Injected text (analysis context,
//! long-term memory) comes from the same deployment's storage and is not
//! escaped.

/// Fixed expert-role template for the chat mode. Includes the memorize
/// command rule: a memorize request must yield a reply that is only a
/// `{"action": "propose_memory_update", "data": ...}` JSON object.
const CHAT_ROLE_TEMPLATE: &str = r#"# РОЛЬ И ЗАДАЧА
Ты — «Вова-Стандарт», ИИ-эксперт мирового класса в области международной и национальной стандартизации (ISO, IEC, EN, ГОСТ, ДСТУ и др.). Твоя основная задача — предоставлять пользователю исчерпывающие, точные и профессиональные консультации.

# СТИЛЬ И ТОН
- **Тон:** Вежливый, деловой, но при этом проактивный и готовый помочь.
- **Структура ответа:** Используй Markdown для форматирования. Ключевые моменты выделяй жирным шрифтом, списки — для перечислений. Ответы должны быть хорошо структурированы и легко читаемы.
- **Полнота важнее краткости:** Сначала дай полный и точный ответ, и только потом стремись к сжатости. Не упускай важные детали ради краткости.

# ПРАВИЛА ПОВЕДЕНИЯ
1.  **Точность и ссылки:** Всегда ссылайся на конкретные стандарты по их полному обозначению (например, "ГОСТ Р ИСО 9001-2015"). Если возможно, указывай конкретные пункты или разделы стандарта.
2.  **Обработка неясностей:** Если запрос пользователя неоднозначен (например, "ГОСТ 12345" без года), НЕ ПРЕДПОЛАГАЙ. Задай уточняющий вопрос. Пример: "Уточните, пожалуйста, год стандарта ГОСТ 12345, так как существует несколько версий."
3.  **Признание ограничений:** Если ты не знаешь ответа или не уверен в его точности, честно сообщи об этом. Пример: "Я не могу найти точную информацию по вашему запросу. Рекомендую обратиться к официальному тексту стандарта."

# СПЕЦИАЛЬНЫЕ КОМАНДЫ
- **[ИНСТРУКЦИЯ ПО ЗАПОМИНАНИЮ]:** Если пользователь просит тебя что-то запомнить (используя фразы "запомни", "запиши в память", "нужно помнить" и т.п.), твоим ЕДИНСТВЕННЫМ ответом должен быть JSON-объект. Не добавляй никакого текста до или после него. JSON должен иметь строго следующую структуру: {"action": "propose_memory_update", "data": "сформулированная_суть_для_запоминания"}."#;

/// Header of the conditional analysis-context block in chat mode.
pub const CHAT_CONTEXT_HEADER: &str = "# АКТУАЛЬНЫЙ КОНТЕКСТ АНАЛИЗА";

/// Header of the conditional long-term-memory block in chat mode.
pub const CHAT_MEMORY_HEADER: &str = "# ДОЛГОВРЕМЕННАЯ ПАМЯТЬ (ВЫСШИЙ ПРИОРИТЕТ)";

/// Fixed base instruction for the analysis mode, demanding a JSON-array-only
/// response matching the supplied schema.
const ANALYSIS_BASE_INSTRUCTION: &str = "Вы — экспертный ИИ-помощник, специализирующийся на стандартизации. Ваша задача — проанализировать список стандартов для указанной страны. Для каждого стандарта определите его существование, полное наименование и текущий статус. Предоставьте точную и краткую информацию. Ваш ответ должен быть ТОЛЬКО JSON-массивом, соответствующим предоставленной схеме. Не добавляйте текст до или после JSON.";

/// Delimiters of the highest-priority memory block in analysis mode.
pub const ANALYSIS_MEMORY_START: &str =
    "[ДОЛГОВРЕМЕННАЯ ПАМЯТЬ ПОЛЬЗОВАТЕЛЯ - ЭТИ ИНСТРУКЦИИ ИМЕЮТ ВЫСШИЙ ПРИОРИТЕТ]";
pub const ANALYSIS_MEMORY_END: &str = "[/ДОЛГОВРЕМЕННАЯ ПАМЯТЬ ПОЛЬЗОВАТЕЛЯ]";

/// Joins the present blocks with blank lines, in the given order.
fn join_blocks(blocks: Vec<Option<String>>) -> String {
    blocks
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Builds the chat-mode system instruction: role rules first, then the
/// analysis-context block iff `analysis_context` is non-empty, then the
/// long-term-memory block iff `long_term_memory` is non-empty.
pub fn chat_system_instruction(analysis_context: &str, long_term_memory: &str) -> String {
    let context_block = (!analysis_context.is_empty()).then(|| {
        format!(
            "{}\nПользователь только что проанализировал следующие стандарты. Учитывай эту информацию при ответах.\n{}",
            CHAT_CONTEXT_HEADER, analysis_context
        )
    });

    let memory_block = (!long_term_memory.is_empty()).then(|| {
        format!(
            "{}\nСледуй этим инструкциям пользователя в первую очередь.\n{}",
            CHAT_MEMORY_HEADER, long_term_memory
        )
    });

    join_blocks(vec![
        Some(CHAT_ROLE_TEMPLATE.to_string()),
        context_block,
        memory_block,
    ])
}

/// Builds the analysis-mode system instruction: the delimited memory block
/// (iff the memory is non-blank) followed by the fixed base instruction.
pub fn analysis_system_instruction(long_term_memory: &str) -> String {
    let memory_block = (!long_term_memory.trim().is_empty()).then(|| {
        format!(
            "{}\n{}\n{}",
            ANALYSIS_MEMORY_START, long_term_memory, ANALYSIS_MEMORY_END
        )
    });

    join_blocks(vec![
        memory_block,
        Some(ANALYSIS_BASE_INSTRUCTION.to_string()),
    ])
}

/// Builds the user-facing analysis prompt: country plus the designation
/// list, one per line, order and duplicates preserved. The two-space
/// indent before the list label is part of the established wording.
pub fn analysis_user_prompt(country: &str, designations: &[String]) -> String {
    format!(
        "Проанализируй следующие стандарты для страны \"{}\".\n  Список стандартов:\n{}",
        country,
        designations.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_instruction_starts_with_role_rules() {
        let built = chat_system_instruction("", "");
        assert!(built.starts_with("# РОЛЬ И ЗАДАЧА"));
        assert!(built.contains("propose_memory_update"));
        assert!(!built.contains(CHAT_CONTEXT_HEADER));
        assert!(!built.contains(CHAT_MEMORY_HEADER));
    }

    #[test]
    fn test_chat_context_block_iff_context_nonempty() {
        let with_context = chat_system_instruction("ГОСТ 12.0.004-2015: действующий", "");
        assert!(with_context.contains(CHAT_CONTEXT_HEADER));
        assert!(with_context.contains("ГОСТ 12.0.004-2015: действующий"));
        assert!(!with_context.contains(CHAT_MEMORY_HEADER));
    }

    #[test]
    fn test_chat_memory_block_iff_memory_nonempty() {
        let with_memory = chat_system_instruction("", "отвечай кратко");
        assert!(!with_memory.contains(CHAT_CONTEXT_HEADER));
        assert!(with_memory.contains(CHAT_MEMORY_HEADER));
        assert!(with_memory.contains("отвечай кратко"));
    }

    #[test]
    fn test_chat_blocks_keep_fixed_order() {
        let built = chat_system_instruction("контекст анализа", "память");
        let role_at = built.find("# РОЛЬ И ЗАДАЧА").unwrap();
        let context_at = built.find(CHAT_CONTEXT_HEADER).unwrap();
        let memory_at = built.find(CHAT_MEMORY_HEADER).unwrap();
        assert!(role_at < context_at);
        assert!(context_at < memory_at);
    }

    #[test]
    fn test_analysis_instruction_without_memory() {
        let built = analysis_system_instruction("");
        assert_eq!(built, ANALYSIS_BASE_INSTRUCTION);

        // Whitespace-only memory counts as unset
        let blank = analysis_system_instruction("   \n");
        assert_eq!(blank, ANALYSIS_BASE_INSTRUCTION);
    }

    #[test]
    fn test_analysis_instruction_memory_precedes_base() {
        let built = analysis_system_instruction("всегда указывай год");
        let start_at = built.find(ANALYSIS_MEMORY_START).unwrap();
        let end_at = built.find(ANALYSIS_MEMORY_END).unwrap();
        let base_at = built.find("Вы — экспертный ИИ-помощник").unwrap();
        assert!(start_at < end_at);
        assert!(end_at < base_at);
        assert!(built.contains("всегда указывай год"));
    }

    #[test]
    fn test_analysis_user_prompt_preserves_order_and_duplicates() {
        let designations = vec![
            "ГОСТ Р 52289-2004".to_string(),
            "ГОСТ 12.0.004-2015".to_string(),
            "ГОСТ Р 52289-2004".to_string(),
        ];
        let prompt = analysis_user_prompt("Россия", &designations);
        assert!(prompt.contains("страны \"Россия\".\n  Список стандартов:\n"));
        assert!(prompt.contains(
            "ГОСТ Р 52289-2004\nГОСТ 12.0.004-2015\nГОСТ Р 52289-2004"
        ));
    }
}
