#![allow(clippy::needless_pass_by_value, clippy::unused_async)]

use crate::clock::{elapsed_field, resolve_clock_time, total_seconds_var, ClockType};
use crate::error::DriverError;
use crate::registry::params::{ClockIndexParams, ClockUpdateParams};
use crate::registry::{CompileContext, Compiled};
use crate::variables::VariableResolver;
use crate::wire::{WireCommand, WireField};

fn clock_index(text: &str) -> WireField {
    WireField::Number(text.trim().parse().ok())
}

fn clock_command(action: &str, p: &ClockIndexParams) -> Compiled {
    Compiled::Socket(WireCommand::new(action).with("clockIndex", clock_index(&p.clock_index)))
}

pub async fn clock_start<V: VariableResolver>(
    _ctx: &CompileContext<'_, V>,
    p: ClockIndexParams,
) -> Result<Compiled, DriverError> {
    Ok(clock_command("clockStart", &p))
}

pub async fn clock_stop<V: VariableResolver>(
    _ctx: &CompileContext<'_, V>,
    p: ClockIndexParams,
) -> Result<Compiled, DriverError> {
    Ok(clock_command("clockStop", &p))
}

pub async fn clock_reset<V: VariableResolver>(
    _ctx: &CompileContext<'_, V>,
    p: ClockIndexParams,
) -> Result<Compiled, DriverError> {
    Ok(clock_command("clockReset", &p))
}

pub async fn clock_update<V: VariableResolver>(
    ctx: &CompileContext<'_, V>,
    p: ClockUpdateParams,
) -> Result<Compiled, DriverError> {
    let index = p.clock_index.trim();
    let (countdown, elapsed, major_version) = ctx.instance.with_session(|s| {
        let stored = s.variable(&total_seconds_var(index));
        (
            resolve_clock_time(&p.clock_time, stored),
            resolve_clock_time(&p.elapsed_time, stored),
            s.major_version,
        )
    });
    let clock_type = ClockType::from_wire(&p.clock_type);
    let elapsed_value = elapsed_field(clock_type, major_version, &countdown, &elapsed);

    let mut cmd = WireCommand::new("clockUpdate")
        .with("clockIndex", clock_index(index))
        .with("clockTime", WireField::Text(countdown.to_string()))
        .with("clockOverrun", WireField::Flag(p.overrun))
        .with("clockType", WireField::text(p.clock_type.trim()))
        .with("clockIsPM", WireField::Number(Some(i64::from(p.is_pm))))
        .with("clockElapsedTime", WireField::Text(elapsed_value.to_string()));
    if !p.clock_name.trim().is_empty() {
        cmd = cmd.with("clockName", WireField::text(p.clock_name.trim()));
    }
    Ok(Compiled::Socket(cmd))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use super::*;
    use crate::settings::ConnectionSettings;
    use crate::state::Instance;
    use crate::variables::NoVariables;
    use serde_json::json;

    fn socket(compiled: Compiled) -> serde_json::Value {
        match compiled {
            Compiled::Socket(cmd) => cmd.to_json(),
            other => panic!("expected socket command, got {other:?}"),
        }
    }

    fn instance_with_reading(major_version: u32, seconds: &str) -> Instance {
        let instance = Instance::new(ConnectionSettings {
            major_version,
            ..ConnectionSettings::default()
        });
        instance.with_session_mut(|s| s.set_variable("pro7_clock_0_totalseconds", seconds));
        instance
    }

    #[tokio::test]
    async fn delta_update_uses_stored_reading() {
        let instance = instance_with_reading(7, "300");
        let ctx = CompileContext::new(&instance, &NoVariables);

        let json = socket(
            clock_update(
                &ctx,
                ClockUpdateParams {
                    clock_index: "0".into(),
                    clock_time: "+30".into(),
                    clock_type: "0".into(),
                    elapsed_time: "00:10:00".into(),
                    ..ClockUpdateParams::default()
                },
            )
            .await
            .unwrap(),
        );
        assert_eq!(
            json,
            json!({
                "action": "clockUpdate",
                "clockIndex": "0",
                "clockTime": "00:00:330",
                "clockOverrun": "false",
                "clockType": "0",
                "clockIsPM": "0",
                "clockElapsedTime": "00:10:00",
            })
        );
    }

    #[tokio::test]
    async fn countdown_to_time_aliases_elapsed_on_generation_7() {
        let instance = instance_with_reading(7, "0");
        let ctx = CompileContext::new(&instance, &NoVariables);
        let params = ClockUpdateParams {
            clock_index: "0".into(),
            clock_time: "09:30:00".into(),
            clock_type: "1".into(),
            is_pm: true,
            elapsed_time: "00:00:00".into(),
            ..ClockUpdateParams::default()
        };

        let json = socket(clock_update(&ctx, params.clone()).await.unwrap());
        assert_eq!(json["clockElapsedTime"], "09:30:00");
        assert_eq!(json["clockIsPM"], "1");

        let older = instance_with_reading(6, "0");
        let ctx = CompileContext::new(&older, &NoVariables);
        let json = socket(clock_update(&ctx, params).await.unwrap());
        assert_eq!(json["clockElapsedTime"], "00:00:00");
    }

    #[tokio::test]
    async fn elapsed_delta_is_computed_on_its_own() {
        let instance = instance_with_reading(7, "120");
        let ctx = CompileContext::new(&instance, &NoVariables);
        let json = socket(
            clock_update(
                &ctx,
                ClockUpdateParams {
                    clock_index: "0".into(),
                    clock_time: "00:05:00".into(),
                    clock_type: "0".into(),
                    elapsed_time: "+10".into(),
                    ..ClockUpdateParams::default()
                },
            )
            .await
            .unwrap(),
        );
        assert_eq!(json["clockTime"], "00:05:00");
        assert_eq!(json["clockElapsedTime"], "00:00:130");
    }

    #[tokio::test]
    async fn aliased_elapsed_carries_the_computed_countdown() {
        let instance = instance_with_reading(7, "600");
        let ctx = CompileContext::new(&instance, &NoVariables);
        let json = socket(
            clock_update(
                &ctx,
                ClockUpdateParams {
                    clock_index: "0".into(),
                    clock_time: "+10".into(),
                    clock_type: "1".into(),
                    elapsed_time: "-30".into(),
                    ..ClockUpdateParams::default()
                },
            )
            .await
            .unwrap(),
        );
        assert_eq!(json["clockTime"], "00:00:610");
        assert_eq!(json["clockElapsedTime"], "00:00:610");
    }

    #[tokio::test]
    async fn missing_reading_sends_nan() {
        let instance = Instance::new(ConnectionSettings::default());
        let ctx = CompileContext::new(&instance, &NoVariables);
        let json = socket(
            clock_update(
                &ctx,
                ClockUpdateParams {
                    clock_index: "3".into(),
                    clock_time: "-10".into(),
                    clock_name: "Walk-in".into(),
                    ..ClockUpdateParams::default()
                },
            )
            .await
            .unwrap(),
        );
        assert_eq!(json["clockTime"], "00:00:NaN");
        assert_eq!(json["clockName"], "Walk-in");
    }

    #[tokio::test]
    async fn start_stop_reset() {
        let instance = Instance::new(ConnectionSettings::default());
        let ctx = CompileContext::new(&instance, &NoVariables);
        let p = ClockIndexParams {
            clock_index: "2".into(),
        };
        assert_eq!(
            socket(clock_start(&ctx, p.clone()).await.unwrap()),
            json!({"action": "clockStart", "clockIndex": "2"})
        );
        assert_eq!(socket(clock_stop(&ctx, p.clone()).await.unwrap())["action"], "clockStop");
        assert_eq!(socket(clock_reset(&ctx, p).await.unwrap())["action"], "clockReset");
    }
}
