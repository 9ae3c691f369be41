//! Model identity derivation.
//!
//! Turns descriptor metadata into stable slug IDs and display names, and
//! collapses multiple quantization releases of one base model into a
//! single entry.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::discovery::metadata::ModelDescriptor;
use crate::discovery::scan::MODEL_FILE_EXTENSION;

/// Quantization tokens recognized at the tail of a file name.
const QUANT_TOKENS: [&str; 12] = [
    "Q4_K_M", "Q4_K_S", "Q4_0", "Q4_1", "Q5_K_M", "Q5_K_S", "Q5_0", "Q5_1", "Q6_K", "Q8_0", "F16",
    "F32",
];

static HYPHEN_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new("-+").expect("literal pattern"));

/// Derive a base model name from a file name: strip the `.gguf`
/// extension (any case), then at most one trailing quantization token in
/// hyphen- or underscore-delimited form. Earlier tokens stay put, so
/// `model-Q4_K_M-Q5_K_S.gguf` becomes `model-Q4_K_M`.
pub fn infer_name_from_filename(file_name: &str) -> String {
    let mut name = file_name;

    if name.len() >= MODEL_FILE_EXTENSION.len() {
        let cut = name.len() - MODEL_FILE_EXTENSION.len();
        if name.is_char_boundary(cut) && name[cut..].eq_ignore_ascii_case(MODEL_FILE_EXTENSION) {
            name = &name[..cut];
        }
    }

    for token in QUANT_TOKENS {
        for sep in ['-', '_'] {
            let suffix = format!("{sep}{token}");
            if let Some(stripped) = name.strip_suffix(suffix.as_str()) {
                return stripped.to_string();
            }
        }
    }

    name.to_string()
}

/// Build the slug identifier for a descriptor: name, size label and
/// finetune joined with hyphens, lowercased and restricted to
/// `[a-z0-9-.]`. Deterministic; collision handling is left to the config
/// synthesizer.
pub fn generate_model_id(meta: &ModelDescriptor) -> String {
    let inferred;
    let mut parts: Vec<&str> = Vec::new();
    for field in [&meta.name, &meta.size_label, &meta.finetune] {
        if !field.is_empty() {
            parts.push(field);
        }
    }
    if parts.is_empty() {
        inferred = infer_name_from_filename(&meta.file_name);
        parts.push(&inferred);
    }

    let id = parts.join("-").to_lowercase().replace([' ', '_'], "-");
    let id: String = id
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '.')
        .collect();
    let id = HYPHEN_RUNS.replace_all(&id, "-");
    id.trim_matches('-').to_string()
}

/// Human-readable name: the same fields as the slug, space-joined with
/// case preserved. Falls back to the inferred file-name base.
pub fn generate_display_name(meta: &ModelDescriptor) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for field in [&meta.name, &meta.size_label, &meta.finetune] {
        if !field.is_empty() {
            parts.push(field);
        }
    }
    if parts.is_empty() {
        return infer_name_from_filename(&meta.file_name);
    }
    parts.join(" ")
}

/// Drop later quantization variants of the same base model, keeping the
/// first descriptor per lower-cased inferred base name in scan order.
pub fn deduplicate(models: Vec<ModelDescriptor>) -> Vec<ModelDescriptor> {
    if models.len() <= 1 {
        return models;
    }

    let mut seen = HashSet::new();
    models
        .into_iter()
        .filter(|m| seen.insert(infer_name_from_filename(&m.file_name).to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn descriptor(name: &str, size_label: &str, finetune: &str, file_name: &str) -> ModelDescriptor {
        ModelDescriptor {
            file_path: PathBuf::from("/models").join(file_name),
            file_name: file_name.to_string(),
            architecture: "llama".to_string(),
            name: name.to_string(),
            size_label: size_label.to_string(),
            context_length: 0,
            embedding_length: 0,
            finetune: finetune.to_string(),
        }
    }

    #[test]
    fn infer_strips_extension_and_quant_token() {
        let cases = [
            ("llama-3.1-8b.gguf", "llama-3.1-8b"),
            ("Llama-3.1-8B-Instruct-Q4_K_M.gguf", "Llama-3.1-8B-Instruct"),
            ("model-Q5_K_S.gguf", "model"),
            ("qwen2_7b_instruct_Q8_0.gguf", "qwen2_7b_instruct"),
            ("model.GGUF", "model"),
            ("phi-2-F16.gguf", "phi-2"),
            ("model-Q4_K_M-Q5_K_S.gguf", "model-Q4_K_M"),
        ];
        for (input, expected) in cases {
            assert_eq!(infer_name_from_filename(input), expected, "{input}");
        }
    }

    #[test]
    fn infer_is_idempotent_once_settled() {
        for input in ["llama-3.1-8b.gguf", "model-Q4_K_M-Q5_K_S.gguf", "plain"] {
            let once = infer_name_from_filename(input);
            assert_eq!(infer_name_from_filename(&once), once, "{input}");
        }
    }

    #[test]
    fn id_from_full_metadata() {
        let meta = descriptor("LLaMA 3.1", "8B", "Instruct", "model.gguf");
        assert_eq!(generate_model_id(&meta), "llama-3.1-8b-instruct");
    }

    #[test]
    fn id_skips_empty_fields() {
        let meta = descriptor("Qwen2", "7B", "", "model.gguf");
        assert_eq!(generate_model_id(&meta), "qwen2-7b");
    }

    #[test]
    fn id_maps_spaces_and_underscores_to_hyphens() {
        let meta = descriptor("Phi Two", "2B", "", "model.gguf");
        assert_eq!(generate_model_id(&meta), "phi-two-2b");

        let meta = descriptor("model_name_test", "1B", "", "model.gguf");
        assert_eq!(generate_model_id(&meta), "model-name-test-1b");
    }

    #[test]
    fn id_fallback_strips_quantization_first() {
        let meta = descriptor("", "", "", "custom-model-Q4_K_M.gguf");
        assert_eq!(generate_model_id(&meta), "custom-model");
    }

    #[test]
    fn id_removes_special_characters() {
        let meta = descriptor("Model@Name#Test!", "", "", "model.gguf");
        assert_eq!(generate_model_id(&meta), "modelnametest");
    }

    #[test]
    fn id_collapses_hyphen_runs() {
        let meta = descriptor("Model--Name---Test", "", "", "model.gguf");
        assert_eq!(generate_model_id(&meta), "model-name-test");
    }

    #[test]
    fn id_preserves_version_dots() {
        let meta = descriptor("LLaMA 3.1.5", "70B", "", "model.gguf");
        assert_eq!(generate_model_id(&meta), "llama-3.1.5-70b");
    }

    #[test]
    fn id_stays_in_the_slug_alphabet() {
        let metas = [
            descriptor("LLaMA 3.1", "8B", "Instruct", "model.gguf"),
            descriptor("Weird  __ Name!!", "", "Chat", "model.gguf"),
            descriptor("", "", "", "Mixtral-8x7B-Q5_K_M.gguf"),
        ];
        for meta in &metas {
            let id = generate_model_id(meta);
            assert!(!id.is_empty());
            assert!(
                id.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.'),
                "{id}"
            );
        }
    }

    #[test]
    fn display_name_preserves_case() {
        let meta = descriptor("LLaMA 3.1", "8B", "Instruct", "model.gguf");
        assert_eq!(generate_display_name(&meta), "LLaMA 3.1 8B Instruct");

        let meta = descriptor("Qwen2", "7B", "", "model.gguf");
        assert_eq!(generate_display_name(&meta), "Qwen2 7B");
    }

    #[test]
    fn display_name_falls_back_to_inferred_base() {
        let meta = descriptor("", "", "", "custom-model-Q4_K_M.gguf");
        assert_eq!(generate_display_name(&meta), "custom-model");
    }

    #[test]
    fn dedup_collapses_quantization_variants() {
        let models = vec![
            descriptor("LLaMA 3", "", "", "llama-3-8b-Q4_K_M.gguf"),
            descriptor("LLaMA 3", "", "", "llama-3-8b-Q5_K_S.gguf"),
            descriptor("LLaMA 3", "", "", "llama-3-8b-Q8_0.gguf"),
        ];
        let kept = deduplicate(models);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].file_name, "llama-3-8b-Q4_K_M.gguf");
    }

    #[test]
    fn dedup_keeps_distinct_base_names() {
        let models = vec![
            descriptor("Model", "", "", "model-7b-Q4_K_M.gguf"),
            descriptor("Model", "", "", "model-13b-Q4_K_M.gguf"),
        ];
        assert_eq!(deduplicate(models).len(), 2);
    }

    #[test]
    fn dedup_preserves_first_seen_order() {
        let models = vec![
            descriptor("B", "", "", "bravo-Q8_0.gguf"),
            descriptor("A", "", "", "alpha-Q8_0.gguf"),
            descriptor("B", "", "", "bravo-F16.gguf"),
            descriptor("C", "", "", "charlie.gguf"),
        ];
        let kept = deduplicate(models);
        let names: Vec<_> = kept.iter().map(|m| m.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["bravo-Q8_0.gguf", "alpha-Q8_0.gguf", "charlie.gguf"]
        );
    }

    #[test]
    fn dedup_is_case_insensitive_on_the_base_key() {
        let models = vec![
            descriptor("", "", "", "Mistral-7B-Q4_K_M.gguf"),
            descriptor("", "", "", "mistral-7b-Q8_0.gguf"),
        ];
        assert_eq!(deduplicate(models).len(), 1);
    }
}
