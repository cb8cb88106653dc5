//! Prompt templates for Referat.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub extraction: ExtractionPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for action item extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionPrompts {
    pub system: String,
    pub user: String,
}

impl Default for ExtractionPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an expert meeting assistant. Analyze this transcript and extract action items.

For each action item, identify:
1. **Assignee**: Who is responsible (focus on "I will", "I'll", and names)
2. **Task Description**: Clear, specific description
3. **Context**: Meeting context and background
4. **Urgency Level**: one of low, medium, high, urgent
5. **Task Type**: one of email_follow_up, document_creation, meeting_scheduling, research, phone_call, reminder, other
6. **Dependencies**: Any mentioned prerequisites
7. **Mentioned Entities**: People, companies, documents, deadlines

Return ONLY a JSON array with a confidence score for each item (0.0-1.0).
Return an empty array [] if there are no action items.

Example output:
[
  {
    "assignee": "John",
    "description": "Send NDA template to Acme Corp",
    "task_type": "document_creation",
    "urgency_level": "medium",
    "entities": {
      "company": "Acme Corp",
      "document_type": "NDA",
      "contact_person": "Sarah Johnson"
    },
    "context": "Discussed partnership opportunity with Acme Corp",
    "estimated_days_to_complete": 2,
    "confidence_score": 0.9
  }
]"#
            .to_string(),

            user: r#"Meeting Transcript:
{{transcript}}

Meeting Metadata:
{{metadata}}

Extract all action items from this transcript following the format specified."#
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
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let extraction_path = custom_path.join("extraction.toml");
            if extraction_path.exists() {
                let content = std::fs::read_to_string(&extraction_path)?;
                prompts.extraction = toml::from_str(&content)?;
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

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
