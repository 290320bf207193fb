//! Rotation
//!
//! Pick the grid identical to the target. Every option is drawn at a random
//! quarter-turn, which is display noise only: correctness is exact equality
//! with the unrotated target.

use serde::Serialize;

use crate::content::{ContentBank, ContentError, RotationGrid, ROTATION_MAX_COLOR};
use crate::core::hash::StateHasher;
use crate::core::rng::DeterministicRng;
use crate::game::context::{GameContext, GameTimer};
use crate::game::events::Cue;
use crate::game::input::{GameInput, InputError};
use crate::game::registry::Variant;
use crate::game::scoring::{score_answer, Points};
use crate::game::state::{AnswerOutcome, GameCore, Phase};
use crate::game::view::VariantView;
use crate::game::{check_option, unsupported, Game};

/// Questions kept from the shuffled bank.
pub const QUESTIONS_PER_INSTANCE: usize = 10;

/// Distractor grids per question.
pub const DISTRACTORS: usize = 3;

/// Display angles.
pub const ROTATIONS: [u16; 3] = [90, 180, 270];

/// Random attempts before the single-cell fallback.
const MAX_ATTEMPTS: usize = 32;

/// One answer option.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RotationOption {
    /// Grid content.
    pub grid: RotationGrid,
    /// Display rotation in degrees.
    pub degrees: u16,
}

/// Visible rotation state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RotationView {
    /// Target grid.
    pub target: Option<RotationGrid>,
    /// Options, each with its display angle.
    pub options: Vec<RotationOption>,
}

/// Grid rotation game.
#[derive(Clone, Debug)]
pub struct Rotation {
    core: GameCore,
    questions: Vec<RotationGrid>,
    target: Option<RotationGrid>,
    options: Vec<RotationOption>,
}

impl Rotation {
    /// Build from the rotation bank: shuffled, first ten kept.
    pub fn new(content: &ContentBank, rng: &mut DeterministicRng) -> Result<Self, ContentError> {
        content.validate(Variant::Rotation)?;
        let mut questions = content.rotation.clone();
        rng.shuffle(&mut questions);
        questions.truncate(QUESTIONS_PER_INSTANCE);

        Ok(Self {
            core: GameCore::new(),
            questions,
            target: None,
            options: Vec::new(),
        })
    }

    /// Current target grid.
    pub fn target(&self) -> Option<&RotationGrid> {
        self.target.as_ref()
    }

    /// Current options.
    pub fn options(&self) -> &[RotationOption] {
        &self.options
    }

    fn next_grid(&mut self, ctx: &mut GameContext<'_>) {
        self.target = None;
        self.options.clear();
        ctx.set_phase(&mut self.core, Phase::Generating);
        let delay = ctx.timing().generate_delay_ms;
        ctx.schedule(delay, GameTimer::Generate);
    }

    fn generate(&mut self, ctx: &mut GameContext<'_>) {
        let index = self.core.total_answered() as usize % self.questions.len().max(1);
        let Some(target) = self.questions.get(index).cloned() else {
            return;
        };

        ctx.cue(Cue::Reveal);
        self.options = generate_options(ctx.rng(), &target);
        self.target = Some(target);
        ctx.set_phase(&mut self.core, Phase::AcceptingInput);
    }
}

/// The target plus three distractors, each at a random display angle, shuffled.
///
/// Distractors never equal the target or each other.
pub fn generate_options(rng: &mut DeterministicRng, target: &RotationGrid) -> Vec<RotationOption> {
    let mut grids: Vec<RotationGrid> = vec![target.clone()];

    while grids.len() < DISTRACTORS + 1 {
        let fresh = (0..MAX_ATTEMPTS)
            .map(|_| distractor(rng, target))
            .find(|grid| !grids.contains(grid))
            .or_else(|| fallback_distractor(target, &grids));

        match fresh {
            Some(grid) => grids.push(grid),
            None => break,
        }
    }

    let mut options: Vec<RotationOption> = grids
        .into_iter()
        .map(|grid| RotationOption {
            grid,
            degrees: *rng.choose(&ROTATIONS).unwrap_or(&ROTATIONS[0]),
        })
        .collect();
    rng.shuffle(&mut options);
    options
}

/// Replace each cell with probability 1/2: a real color two times in five,
/// otherwise filler.
fn distractor(rng: &mut DeterministicRng, target: &RotationGrid) -> RotationGrid {
    let mut grid = target.clone();
    for cell in grid.iter_mut().flatten() {
        if rng.next_bool_half() {
            let number = rng.next_int(10) as u8 + 1;
            *cell = if number <= ROTATION_MAX_COLOR { number } else { 0 };
        }
    }
    grid
}

/// First single-cell change of the target not already taken.
fn fallback_distractor(target: &RotationGrid, taken: &[RotationGrid]) -> Option<RotationGrid> {
    for (row, cells) in target.iter().enumerate() {
        for (col, &value) in cells.iter().enumerate() {
            for replacement in (0..=ROTATION_MAX_COLOR).filter(|&v| v != value) {
                let mut grid = target.clone();
                grid[row][col] = replacement;
                if !taken.contains(&grid) {
                    return Some(grid);
                }
            }
        }
    }
    None
}

impl Game for Rotation {
    fn variant(&self) -> Variant {
        Variant::Rotation
    }

    fn core(&self) -> &GameCore {
        &self.core
    }

    fn start(&mut self, ctx: &mut GameContext<'_>) {
        self.next_grid(ctx);
    }

    fn on_timer(&mut self, timer: GameTimer, ctx: &mut GameContext<'_>) {
        match timer {
            GameTimer::Generate => self.generate(ctx),
            GameTimer::Settle => {
                if !ctx.check_completion(&mut self.core) {
                    self.next_grid(ctx);
                }
            }
            _ => {}
        }
    }

    fn submit(&mut self, input: &GameInput, ctx: &mut GameContext<'_>) -> Result<AnswerOutcome, InputError> {
        let GameInput::Choose { option } = *input else {
            return Err(unsupported(self.variant(), input));
        };
        let index = check_option(option, self.options.len())?;
        let target = self.target.as_ref().ok_or(InputError::NoActiveQuestion)?;

        let correct = &self.options[index].grid == target;
        Ok(score_answer(&mut self.core, ctx, correct, Points::STANDARD))
    }

    fn view(&self) -> VariantView {
        VariantView::Rotation(RotationView {
            target: self.target.clone(),
            options: self.options.clone(),
        })
    }

    fn hash_into(&self, hasher: &mut StateHasher) {
        self.core.hash_into(hasher);
        hasher.update_option(self.target.as_ref(), |h, grid| {
            for cell in grid.iter().flatten() {
                h.update_u8(*cell);
            }
        });
        for option in &self.options {
            hasher.update_u32(option.degrees as u32);
            for cell in option.grid.iter().flatten() {
                hasher.update_u8(*cell);
            }
        }
    }
}
