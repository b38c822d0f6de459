//! Prompt templates for docqa.
//!
//! The QA prompt can be customized by placing a `qa.toml` file in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub qa: QaPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompt for grounded question answering.
///
/// `template` must contain `{{context}}` and `{{question}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QaPrompts {
    pub instruction: String,
    pub template: String,
}

impl Default for QaPrompts {
    fn default() -> Self {
        Self {
            instruction: "Use ONLY the following pieces of context to answer the question at the end. \
If you don't know the answer, or the answer isn't contained in the context, just say that you don't know; \
don't try to make up an answer. Use three sentences maximum and keep the answer concise."
                .to_string(),
            template: r#"{{instruction}}

Context:
{{context}}

Question: {{question}}

Answer:"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = super::Settings::expand_path(dir);

            let qa_path = custom_path.join("qa.toml");
            if qa_path.exists() {
                let content = std::fs::read_to_string(&qa_path)?;
                prompts.qa = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Assemble the full QA prompt for a question and its retrieved context.
    ///
    /// The instruction and custom variables are resolved in the template only.
    /// Context and question are filled in one pass, so their text is inserted
    /// as is, even when it contains `{{...}}`.
    pub fn render_qa(&self, context: &str, question: &str) -> String {
        let mut instruction = HashMap::new();
        instruction.insert("instruction".to_string(), self.qa.instruction.clone());
        let template = Self::render(&self.qa.template, &instruction);

        let mut custom = self.variables.clone();
        custom.remove("context");
        custom.remove("question");
        let template = Self::render(&template, &custom);

        fill_once(&template, &[("context", context), ("question", question)])
    }
}

/// Replace `{{key}}` placeholders in a single left-to-right scan.
///
/// Inserted values are never scanned again.
fn fill_once(template: &str, values: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        result.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let hit = values.iter().find(|&&(key, _)| {
            after.starts_with(key) && after[key.len()..].starts_with("}}")
        });
        match hit {
            Some(&(key, value)) => {
                result.push_str(value);
                rest = &after[key.len() + 2..];
            }
            None => {
                result.push_str("{{");
                rest = after;
            }
        }
    }

    result.push_str(rest);
    result
}
