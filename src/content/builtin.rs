//! Bundled content bank.

use super::{ContentBank, DefinitionEntry, RotationGrid, TowerConfig, TowerQuestion};
use crate::game::variants::maths::{MathsPuzzle, Operator::{self, *}};

impl ContentBank {
    /// A small bank covering every content-driven variant.
    pub fn builtin() -> Self {
        Self {
            definitions: definitions(),
            maths: maths(),
            rotation: rotation(),
            towers: towers(),
            objects: objects(),
        }
    }
}

fn definitions() -> Vec<DefinitionEntry> {
    const WORDS: [(&str, &str); 14] = [
        ("Laconic", "Using very few words"),
        ("Ephemeral", "Lasting for a very short time"),
        ("Obdurate", "Stubbornly refusing to change one's opinion"),
        ("Perfidious", "Deceitful and untrustworthy"),
        ("Sanguine", "Optimistic, especially in a difficult situation"),
        ("Pellucid", "Translucently clear"),
        ("Recalcitrant", "Having an uncooperative attitude towards authority"),
        ("Mendacious", "Not telling the truth"),
        ("Taciturn", "Reserved or uncommunicative in speech"),
        ("Ineffable", "Too great to be expressed in words"),
        ("Obsequious", "Excessively eager to please or obey"),
        ("Quixotic", "Exceedingly idealistic and impractical"),
        ("Vituperate", "Blame or insult in strong language"),
        ("Lugubrious", "Looking or sounding sad and dismal"),
    ];

    WORDS
        .iter()
        .map(|(word, definition)| DefinitionEntry {
            word: word.to_string(),
            definition: definition.to_string(),
        })
        .collect()
}

fn maths() -> Vec<MathsPuzzle> {
    let solutions: [([[i64; 3]; 3], [[Operator; 2]; 3], [[Operator; 2]; 3]); 4] = [
        (
            [[4, 3, 2], [1, 5, 6], [8, 2, 4]],
            [[Add, Multiply], [Add, Multiply], [Multiply, Subtract]],
            [[Add, Add], [Add, Multiply], [Add, Multiply]],
        ),
        (
            [[9, 3, 2], [6, 2, 5], [3, 7, 1]],
            [[Divide, Add], [Subtract, Multiply], [Multiply, Subtract]],
            [[Subtract, Multiply], [Multiply, Add], [Add, Multiply]],
        ),
        (
            [[7, 2, 3], [5, 4, 2], [6, 3, 9]],
            [[Multiply, Subtract], [Add, Divide], [Divide, Add]],
            [[Add, Subtract], [Multiply, Divide], [Subtract, Add]],
        ),
        (
            [[8, 4, 6], [2, 9, 3], [5, 1, 7]],
            [[Divide, Multiply], [Multiply, Subtract], [Subtract, Add]],
            [[Multiply, Subtract], [Add, Multiply], [Divide, Add]],
        ),
    ];

    solutions
        .iter()
        .filter_map(|(numbers, rows, cols)| MathsPuzzle::from_solution(*numbers, *rows, *cols))
        .collect()
}

fn rotation() -> Vec<RotationGrid> {
    const GRIDS: [[[u8; 4]; 4]; 10] = [
        [[1, 0, 2, 0], [0, 3, 0, 4], [2, 0, 1, 0], [0, 4, 0, 3]],
        [[1, 1, 0, 2], [0, 3, 3, 0], [4, 0, 2, 2], [0, 4, 0, 1]],
        [[2, 0, 0, 1], [0, 3, 4, 0], [0, 4, 3, 0], [1, 0, 0, 3]],
        [[3, 3, 1, 0], [0, 2, 0, 4], [4, 0, 2, 0], [0, 1, 3, 3]],
        [[4, 0, 1, 2], [0, 0, 3, 0], [2, 1, 0, 0], [0, 3, 0, 4]],
        [[1, 2, 3, 4], [0, 0, 0, 0], [4, 0, 2, 0], [0, 3, 0, 1]],
        [[0, 2, 0, 2], [1, 0, 1, 0], [0, 4, 0, 3], [3, 0, 4, 0]],
        [[2, 2, 0, 0], [2, 0, 0, 1], [0, 0, 3, 1], [0, 4, 3, 0]],
        [[0, 1, 4, 0], [3, 0, 0, 2], [2, 0, 0, 3], [0, 4, 1, 0]],
        [[4, 3, 0, 1], [0, 2, 1, 0], [1, 0, 2, 0], [0, 1, 3, 4]],
    ];

    GRIDS
        .iter()
        .map(|grid| grid.iter().map(|row| row.to_vec()).collect())
        .collect()
}

fn towers() -> Vec<TowerQuestion> {
    let pairs: [([&[u8]; 3], [&[u8]; 3]); 10] = [
        ([&[3, 2, 1], &[], &[]], [&[], &[], &[3, 2, 1]]),
        ([&[3, 2, 1], &[], &[]], [&[3], &[2, 1], &[]]),
        ([&[3, 2], &[1], &[]], [&[], &[3, 2, 1], &[]]),
        ([&[3], &[2], &[1]], [&[], &[3, 2, 1], &[]]),
        ([&[2, 1], &[3], &[]], [&[], &[], &[3, 2, 1]]),
        ([&[3, 1], &[2], &[]], [&[2], &[3, 1], &[]]),
        ([&[], &[3, 2, 1], &[]], [&[1], &[3], &[2]]),
        ([&[3], &[], &[2, 1]], [&[2, 1], &[3], &[]]),
        ([&[1], &[3, 2], &[]], [&[3, 2, 1], &[], &[]]),
        ([&[2], &[1], &[3]], [&[3, 1], &[], &[2]]),
    ];

    let to_config = |rods: &[&[u8]; 3]| -> TowerConfig { rods.iter().map(|rod| rod.to_vec()).collect() };

    pairs
        .iter()
        .filter_map(|(start, end)| TowerQuestion::solved(to_config(start), to_config(end)))
        .collect()
}

fn objects() -> Vec<Vec<String>> {
    const SETS: [&[&str]; 14] = [
        &["car", "bus.flip", "bicycle"],
        &["house", "building.2", "tent"],
        &["cup.and.saucer", "mug", "wineglass"],
        &["leaf", "tree", "camera.macro"],
        &["hammer", "wrench", "screwdriver"],
        &["cloud", "cloud.rain", "snowflake"],
        &["guitars", "pianokeys", "music.mic"],
        &["book", "newspaper", "magazine"],
        &["fish", "tortoise", "hare.flip"],
        &["lamp.desk", "lightbulb", "flashlight.on.fill"],
        &["scissors", "paperclip", "pencil"],
        &["airplane", "ferry", "sailboat"],
        &["key", "lock", "door.left.hand.open"],
        &["umbrella", "sun.max", "moon"],
    ];

    SETS.iter()
        .map(|set| set.iter().map(|icon| icon.to_string()).collect())
        .collect()
}
