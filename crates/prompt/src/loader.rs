//! Prompt library: built-in definitions plus on-disk overrides.

use crate::types::PromptDefinition;
use guide_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Definitions compiled into the binary, one per generating intent.
const BUILTIN_PROMPTS: [(&str, &str); 6] = [
    ("guide.faq", include_str!("../prompts/guide.faq.yml")),
    ("guide.itinerary", include_str!("../prompts/guide.itinerary.yml")),
    ("guide.attractions", include_str!("../prompts/guide.attractions.yml")),
    ("guide.routes", include_str!("../prompts/guide.routes.yml")),
    ("guide.hotels", include_str!("../prompts/guide.hotels.yml")),
    ("guide.classify", include_str!("../prompts/guide.classify.yml")),
];

/// Loaded prompt definitions with their templates compiled once.
pub struct PromptLibrary {
    definitions: BTreeMap<String, PromptDefinition>,
    registry: Handlebars<'static>,
}

impl std::fmt::Debug for PromptLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptLibrary")
            .field("ids", &self.definitions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PromptLibrary {
    /// Library containing only the built-in definitions.
    pub fn builtin() -> AppResult<Self> {
        let mut definitions = BTreeMap::new();
        for (id, source) in BUILTIN_PROMPTS {
            let definition = parse_prompt(source, id)?;
            definitions.insert(definition.id.clone(), definition);
        }
        Self::from_definitions(definitions)
    }

    /// Built-in definitions, overridden by any `<id>.yml` found in `dir`.
    ///
    /// A missing directory is not an error; an unreadable or invalid file is.
    pub fn load(dir: Option<&Path>) -> AppResult<Self> {
        let mut definitions = BTreeMap::new();
        for (id, source) in BUILTIN_PROMPTS {
            let definition = parse_prompt(source, id)?;
            definitions.insert(definition.id.clone(), definition);
        }

        if let Some(dir) = dir.filter(|d| d.exists()) {
            for definition in load_dir(dir)? {
                if definitions.contains_key(&definition.id) {
                    tracing::info!("Prompt {} overridden from {:?}", definition.id, dir);
                } else {
                    tracing::info!("Loaded extra prompt {} from {:?}", definition.id, dir);
                }
                definitions.insert(definition.id.clone(), definition);
            }
        }

        Self::from_definitions(definitions)
    }

    fn from_definitions(definitions: BTreeMap<String, PromptDefinition>) -> AppResult<Self> {
        let mut registry = Handlebars::new();
        // Plain text, not HTML
        registry.register_escape_fn(handlebars::no_escape);

        for def in definitions.values() {
            registry
                .register_template_string(&template_name(&def.id), &def.template)
                .map_err(|e| {
                    AppError::Prompt(format!("Failed to register template {}: {}", def.id, e))
                })?;
            registry
                .register_template_string(&system_name(&def.id), &def.system)
                .map_err(|e| {
                    AppError::Prompt(format!("Failed to register system for {}: {}", def.id, e))
                })?;
        }

        Ok(Self {
            definitions,
            registry,
        })
    }

    /// Look up a definition by id.
    pub fn get(&self, prompt_id: &str) -> AppResult<&PromptDefinition> {
        self.definitions
            .get(prompt_id)
            .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", prompt_id)))
    }

    /// All known prompt ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        self.definitions.keys().cloned().collect()
    }

    pub(crate) fn render_template(
        &self,
        prompt_id: &str,
        variables: &HashMap<String, String>,
    ) -> AppResult<String> {
        self.render(&template_name(prompt_id), variables)
    }

    pub(crate) fn render_system(
        &self,
        prompt_id: &str,
        variables: &HashMap<String, String>,
    ) -> AppResult<String> {
        self.render(&system_name(prompt_id), variables)
    }

    fn render(&self, name: &str, variables: &HashMap<String, String>) -> AppResult<String> {
        self.registry
            .render(name, variables)
            .map_err(|e| AppError::Prompt(format!("Failed to render template {}: {}", name, e)))
    }
}

fn template_name(id: &str) -> String {
    format!("{}.user", id)
}

fn system_name(id: &str) -> String {
    format!("{}.system", id)
}

/// Read every `*.yml` / `*.yaml` definition directly inside `dir`.
fn load_dir(dir: &Path) -> AppResult<Vec<PromptDefinition>> {
    let mut definitions = Vec::new();

    for entry in walkdir::WalkDir::new(dir)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yml") | Some("yaml")
        );
        if path.is_file() && is_yaml {
            definitions.push(load_prompt_file(path)?);
        }
    }

    Ok(definitions)
}

/// Load and validate a single prompt file.
pub fn load_prompt_file(path: &Path) -> AppResult<PromptDefinition> {
    tracing::debug!("Loading prompt from: {:?}", path);

    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Prompt(format!("Failed to read prompt file {:?}: {}", path, e))
    })?;

    parse_prompt(&contents, &path.display().to_string())
}

fn parse_prompt(contents: &str, origin: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(contents).map_err(|e| {
        AppError::Prompt(format!("Failed to parse prompt YAML {}: {}", origin, e))
    })?;

    validate_prompt(&definition)?;
    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(format!(
            "Prompt template cannot be empty: {}",
            def.id
        )));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_prompt(dir: &Path, file: &str, id: &str, template: &str) {
        let content = format!(
            r#"
id: {}
title: "Override"
apiVersion: "1.0"
system: "Custom system"
template: "{}"
"#,
            id, template
        );
        fs::write(dir.join(file), content).unwrap();
    }

    #[test]
    fn test_builtin_library_has_every_intent_prompt() {
        let library = PromptLibrary::builtin().unwrap();
        for id in [
            "guide.faq",
            "guide.itinerary",
            "guide.attractions",
            "guide.routes",
            "guide.hotels",
            "guide.classify",
        ] {
            assert!(library.get(id).is_ok(), "missing {}", id);
        }
    }

    #[test]
    fn test_unknown_prompt() {
        let library = PromptLibrary::builtin().unwrap();
        let err = library.get("guide.nope").unwrap_err();
        assert!(err.to_string().contains("Unknown prompt"));
    }

    #[test]
    fn test_directory_overrides_builtin() {
        let temp = TempDir::new().unwrap();
        write_prompt(temp.path(), "faq.yml", "guide.faq", "Q: {{query}}");

        let library = PromptLibrary::load(Some(temp.path())).unwrap();
        let def = library.get("guide.faq").unwrap();
        assert_eq!(def.title, "Override");
        assert_eq!(def.system, "Custom system");
        // Other built-ins untouched
        assert_ne!(library.get("guide.routes").unwrap().title, "Override");
    }

    #[test]
    fn test_missing_directory_is_fine() {
        let temp = TempDir::new().unwrap();
        let library = PromptLibrary::load(Some(&temp.path().join("absent"))).unwrap();
        assert_eq!(library.ids().len(), 6);
    }

    #[test]
    fn test_invalid_override_fails() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("broken.yml"),
            "id: guide.faq\ntitle: Broken\napiVersion: \"1\"\ntemplate: \"x\"\n",
        )
        .unwrap();

        let err = PromptLibrary::load(Some(temp.path())).unwrap_err();
        assert!(err.to_string().contains("Invalid apiVersion"));
    }

    #[test]
    fn test_non_yaml_files_ignored() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("notes.txt"), "not a prompt").unwrap();
        assert!(PromptLibrary::load(Some(temp.path())).is_ok());
    }
}
