//! Dice rolling endpoints.
//!
//! - `GET /rolldice` rolls one six-sided die and returns the value as text.
//! - `GET /rolldicee?rolls=N` rolls N dice and returns a JSON array.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use rolldice_shared::dice::{DiceRange, DiceRoll};
use serde::Deserialize;
use validator::Validate;

use super::parse_integer;
use crate::error::ApiError;
use crate::state::AppState;

/// Largest number of dice a single `/rolldicee` request may roll.
pub const MAX_ROLLS: i64 = 1000;

/// Query parameters of `/rolldicee`.
///
/// `rolls` is kept as text so that malformed numbers get the same 400 as a
/// missing parameter instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct RollsQuery {
    /// Requested number of dice.
    pub rolls: Option<String>,
}

#[derive(Debug, Validate)]
struct RollsRequest {
    #[validate(range(min = 1, max = MAX_ROLLS))]
    rolls: i64,
}

impl RollsQuery {
    fn count(&self) -> Result<usize, ApiError> {
        let rolls = self
            .rolls
            .as_deref()
            .and_then(parse_integer)
            .ok_or(ApiError::InvalidRolls)?;

        let request = RollsRequest { rolls };
        request
            .validate()
            .map_err(|_| ApiError::RollsOutOfRange { max: MAX_ROLLS })?;
        usize::try_from(request.rolls).map_err(|_| ApiError::RollsOutOfRange { max: MAX_ROLLS })
    }
}

/// Creates the dice routes.
pub fn dice_routes() -> Router<AppState> {
    Router::new()
        .route("/rolldice", get(roll_dice))
        .route("/rolldicee", get(roll_many_dice))
}

async fn roll_dice(State(state): State<AppState>) -> String {
    let roll = state.dice().roll(DiceRange::STANDARD);
    state.metrics().record_rolls(&[roll]);

    let value = roll.value();
    let logger = state.logger();
    logger
        .info(format!("Dice rolled: {value}"))
        .attr("roll_value", value)
        .emit();

    if value <= 1 {
        logger
            .warn(format!("Low dice roll: {value}"))
            .attr("roll_value", value)
            .emit();
    }

    if value > 5 {
        logger
            .error(format!("Unexpectedly high dice roll: {value}"))
            .attr("roll_value", value)
            .attr("error_description", "Dice roll should be between 1 and 6")
            .emit();
    }

    value.to_string()
}

async fn roll_many_dice(
    State(state): State<AppState>,
    Query(query): Query<RollsQuery>,
) -> Result<Json<Vec<DiceRoll>>, ApiError> {
    let count = query.count().inspect_err(|err| {
        state
            .logger()
            .error("Invalid roll parameter")
            .attr("error_description", err.to_string())
            .emit();
    })?;

    let rolls = state.dice().roll_many(DiceRange::STANDARD, count);
    state.metrics().record_rolls(&rolls);
    state.logger().info(format!("Rolled {count} dice")).emit();

    Ok(Json(rolls))
}
