use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::ResponseNode;

/// Generate a full binary tree `levels` rows deep (plus the leaf row).
/// Internal nodes alternate "Red"/"Blue" by level; leaves get a random
/// numeric name in 0..=20 and no color.
pub fn generate_binary_tree<R: Rng + ?Sized>(levels: u32, rng: &mut R) -> ResponseNode {
    generate_level(levels, 0, rng)
}

/// Same as [`generate_binary_tree`] with a reproducible seed.
pub fn seeded_binary_tree(levels: u32, seed: u64) -> ResponseNode {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_binary_tree(levels, &mut rng)
}

fn generate_level<R: Rng + ?Sized>(levels: u32, current: u32, rng: &mut R) -> ResponseNode {
    if current >= levels {
        let name: u32 = rng.random_range(0..=20);
        return ResponseNode::leaf(name.to_string());
    }

    let children = vec![
        generate_level(levels, current + 1, rng),
        generate_level(levels, current + 1, rng),
    ];
    let color = if current % 2 == 0 { "Red" } else { "Blue" };

    ResponseNode {
        level: Some(current as i32),
        ..ResponseNode::branch(format!("Node Level {current}"), children).with_color(color)
    }
}
