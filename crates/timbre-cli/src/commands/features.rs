use timbre_core::{Feature, FeatureRange};

pub fn list_features() {
    println!("\n🎼 Audio features\n");
    for feature in Feature::ALL {
        let range = match feature.range() {
            FeatureRange::Unit => String::from("0.0 – 1.0"),
            FeatureRange::Class { max } => format!("0 – {max} (class)"),
            FeatureRange::Unbounded => String::from("> 0 (unbounded)"),
        };
        println!("  {:<18} {range}", feature.name());
    }
    println!("\nAll features are min-max normalized per batch before comparison.");
    println!("Weight any of them with --weight <feature>=<multiplier>.");
}
