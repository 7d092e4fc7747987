use crate::shared::*;

/// Crop types the farm can grow.
///
/// Times are real seconds. Every crop has three visual stages
/// (sprout, half-grown, ripe); the last one is shown once it can be harvested.
pub fn default_crops() -> Vec<CropDef> {
    let defs: [(&str, f32, f32, u32); 5] = [
        ("Carrots", 10.0, 30.0, 10),
        ("Tomatoes", 14.0, 30.0, 14),
        ("Corn", 18.0, 40.0, 18),
        ("Potatoes", 12.0, 30.0, 12),
        ("Wheat", 8.0, 25.0, 8),
    ];

    defs.iter()
        .map(|&(crop_type, growth_secs, wither_secs, harvest_value)| CropDef {
            crop_type: crop_type.to_string(),
            growth_secs,
            wither_secs,
            harvest_value,
            growth_stages: 3,
        })
        .collect()
}
