//! The configuration shipped in `config/` must build a valid crew.

use gamecrew_crew::{
    load_agents, load_tasks, Crew, CrewInputs, CrewSettings, ImageGenerationTool, ToolSet,
    HTML_TEMPLATE_KEY,
};
use gamecrew_llm::ProviderConfig;
use std::path::{Path, PathBuf};

fn settings() -> CrewSettings {
    let config_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../config");
    CrewSettings::new(config_dir, "unused")
}

fn game_crew(settings: &CrewSettings, images: &Path) -> Crew {
    let tools = ToolSet::new()
        .with(ImageGenerationTool::new(ProviderConfig::openai("sk-test"), images).unwrap());
    Crew::from_config(
        load_agents(settings.agents_path()).unwrap(),
        load_tasks(settings.tasks_path()).unwrap(),
        &tools,
    )
    .unwrap()
}

#[test]
fn shipped_config_builds_the_game_crew() {
    let settings = settings();
    let images = tempfile::tempdir().unwrap();
    let crew = game_crew(&settings, images.path());

    assert_eq!(
        crew.task_names(),
        [
            "generate_game_logic",
            "design_ui_ux",
            "handle_input_controls",
            "generate_visual_assets",
            "integrate_assets",
            "integrate_code_modules",
            "test_and_debug_game",
        ]
    );
    assert_eq!(crew.agents().len(), 7);

    let artist = crew.agent("image_asset_agent").unwrap();
    assert_eq!(artist.tool_names(), ["image_generation"]);
    assert_eq!(artist.model(), Some("gpt-4o-mini"));
}

#[test]
fn shipped_inputs_fill_every_placeholder() {
    let settings = settings();
    let inputs = CrewInputs::load(settings.inputs_path()).unwrap();

    assert_eq!(inputs.get("platform"), Some("mobile + desktop"));
    assert_eq!(inputs.get("player_features"), Some("torchlight, dynamic maze, hidden keys"));
    assert!(inputs.get(HTML_TEMPLATE_KEY).unwrap().contains("<canvas id=\"game\">"));

    let images = tempfile::tempdir().unwrap();
    let crew = game_crew(&settings, images.path());

    for task in crew.tasks() {
        let prompt = task.prompt(&inputs, "");
        for key in ["{platform}", "{difficulty}", "{player_features}", "{html_template}"] {
            assert!(!prompt.contains(key), "{} left in {}", key, task.name);
        }
    }
}
