//! Line commands read from stdin.

use anyhow::{anyhow, bail, Context, Result};
use shared::{
    domain::PoiId,
    protocol::{MarkerKind, SessionCommand},
};

pub const HELP: &str = "\
commands:
  click <lng> <lat>          map surface click
  marker waypoint <index>    click a waypoint marker
  marker poi <id>            click a point-of-interest marker
  locate <lng> <lat>         geolocation result
  locate-error <code>        geolocation failure
  poi [label...]             add point of interest at the selection
  remove-poi <id>            delete a point of interest
  waypoint                   add waypoint at the selection
  delete <index>             delete waypoint
  route <index>              make a route alternative active
  route-to <poi>             route from the current location to a point of interest
  draw                       toggle drawing mode
  clear-waypoints | clear-area | close
  show | help | quit";

#[derive(Debug, PartialEq)]
pub enum LineCommand {
    Session(SessionCommand),
    Show,
    Help,
    Quit,
}

pub fn parse_line(line: &str) -> Result<Option<LineCommand>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match verb {
        "click" => {
            let (lng, lat) = coordinate_args(&args)?;
            SessionCommand::SurfaceClick { lng, lat }
        }
        "marker" => {
            let kind = match args.first().copied() {
                Some("waypoint") => MarkerKind::Waypoint,
                Some("poi") => MarkerKind::PointOfInterest,
                other => bail!("unknown marker kind: {}", other.unwrap_or("<missing>")),
            };
            SessionCommand::MarkerClick {
                kind,
                id: number_arg(&args, 1, "marker id")?,
            }
        }
        "locate" => {
            let (lng, lat) = coordinate_args(&args)?;
            SessionCommand::LocateResult { lng, lat }
        }
        "locate-error" => SessionCommand::LocateError {
            code: number_arg(&args, 0, "error code")?,
        },
        "poi" => SessionCommand::AddPointOfInterest {
            label: (!args.is_empty()).then(|| args.join(" ")),
        },
        "remove-poi" => SessionCommand::RemovePointOfInterest {
            poi: PoiId(number_arg(&args, 0, "poi id")?),
        },
        "waypoint" => SessionCommand::AddWaypoint,
        "delete" => SessionCommand::DeleteWaypoint {
            index: number_arg(&args, 0, "waypoint index")?,
        },
        "route" => SessionCommand::SelectRoute {
            index: number_arg(&args, 0, "route index")?,
        },
        "route-to" => SessionCommand::RouteFromLocationTo {
            poi: PoiId(number_arg(&args, 0, "poi id")?),
        },
        "draw" => SessionCommand::ToggleDrawing,
        "clear-waypoints" => SessionCommand::ClearWaypoints,
        "clear-area" => SessionCommand::ClearDrawnArea,
        "close" => SessionCommand::CloseSelection,
        "show" => return Ok(Some(LineCommand::Show)),
        "help" => return Ok(Some(LineCommand::Help)),
        "quit" | "exit" => return Ok(Some(LineCommand::Quit)),
        other => bail!("unknown command '{other}' (try 'help')"),
    };
    Ok(Some(LineCommand::Session(command)))
}

fn coordinate_args(args: &[&str]) -> Result<(f64, f64)> {
    Ok((
        number_arg(args, 0, "longitude")?,
        number_arg(args, 1, "latitude")?,
    ))
}

fn number_arg<T>(args: &[&str], position: usize, name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = args
        .get(position)
        .ok_or_else(|| anyhow!("missing {name}"))?;
    raw.parse::<T>()
        .with_context(|| format!("invalid {name}: '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_surface_click() {
        assert_eq!(
            parse_line("click -122.40 37.80").expect("parse"),
            Some(LineCommand::Session(SessionCommand::SurfaceClick {
                lng: -122.40,
                lat: 37.80
            }))
        );
    }

    #[test]
    fn parses_marker_and_labelled_poi() {
        assert_eq!(
            parse_line("marker poi 4").expect("parse"),
            Some(LineCommand::Session(SessionCommand::MarkerClick {
                kind: MarkerKind::PointOfInterest,
                id: 4
            }))
        );
        assert_eq!(
            parse_line("poi Ferry Building").expect("parse"),
            Some(LineCommand::Session(SessionCommand::AddPointOfInterest {
                label: Some("Ferry Building".into())
            }))
        );
        assert_eq!(
            parse_line("poi").expect("parse"),
            Some(LineCommand::Session(SessionCommand::AddPointOfInterest {
                label: None
            }))
        );
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(parse_line("   ").expect("parse"), None);
    }

    #[test]
    fn reports_bad_arguments() {
        let err = parse_line("delete two").expect_err("bad index");
        assert!(err.to_string().contains("invalid waypoint index"));
        let err = parse_line("click 1.0").expect_err("missing lat");
        assert!(err.to_string().contains("missing latitude"));
        assert!(parse_line("teleport").is_err());
        assert!(parse_line("marker peer 1").is_err());
    }
}
