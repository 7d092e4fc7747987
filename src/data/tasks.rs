use crate::shared::*;

/// The tasks a new game starts with, in the order they are offered.
pub fn default_starting_tasks() -> Vec<TaskDef> {
    let defs: [(&str, &str, u32, u32); 5] = [
        ("Plant 5 Crops", "Plant 5 crops in the farm", 5, 50),
        ("Harvest 3 Crops", "Harvest 3 fully grown crops", 3, 75),
        ("Water 10 Plants", "Water 10 planted crops", 10, 40),
        ("Collect Eggs", "Collect 5 eggs from chickens", 5, 60),
        ("Milk Cows", "Milk 3 cows", 3, 80),
    ];

    defs.iter()
        .map(|&(name, description, target, reward)| TaskDef {
            name: name.to_string(),
            description: description.to_string(),
            target,
            reward,
        })
        .collect()
}

/// Pool for tasks synthesized once every catalog task has been offered.
pub fn default_random_templates() -> RandomTaskTemplates {
    RandomTaskTemplates {
        verbs: ["Plant", "Harvest", "Water"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        objects: ["Carrots", "Tomatoes", "Corn", "Potatoes", "Wheat"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        target_range: (3, 7),
        reward_range: (30, 69),
    }
}
