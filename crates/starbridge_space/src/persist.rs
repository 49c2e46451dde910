//! Saving and restoring the contents of [`Space`].
//!
//! Record layout:
//!
//! ```text
//! game time
//! has system, [system SysLoc]
//! body count
//! per body: index, type code, label, position x/y/z, has sbody, [SBodyPath], kind data
//! player index (0 = none)
//! ```
//!
//! References between bodies (a ship's docking partner, the player) are
//! written as registry indices and re-linked once every body exists again.

use std::collections::HashSet;

use starbridge_foundation::{BodyId, Error, Reader, Result, Writer};
use tracing::{debug, info, warn};

use crate::object::{BBAdvert, Body, BodyData, FlightState, ObjectType, ShipData, StationData};
use crate::registry::{BodyIndex, EntityRegistry};
use crate::space::Space;
use crate::system::{SBodyPath, StarSystem, SysLoc, SystemGenerator};

fn type_code(kind: ObjectType) -> u32 {
    match kind {
        ObjectType::Ship => 1,
        ObjectType::Player => 2,
        ObjectType::SpaceStation => 3,
        ObjectType::Planet => 4,
        ObjectType::Star => 5,
        ObjectType::CargoBody => 6,
        ObjectType::Body | ObjectType::ModelBody | ObjectType::Projectile => 0,
    }
}

/// A body read back from a record, before it is placed in space.
struct PendingBody {
    index: u32,
    body: Body,
    docked_with: u32,
}

impl Space {
    /// Writes every persistable body, assigning registry indices as needed.
    pub fn save(&self, wr: &mut Writer, registry: &mut dyn EntityRegistry) {
        wr.double(self.game_time());
        match self.current_location() {
            Some(loc) => {
                wr.bool(true);
                loc.serialize(wr);
            }
            None => wr.bool(false),
        }

        let persistable: Vec<_> = self
            .bodies()
            .filter(|(_, body)| body.object_type().is_persistable())
            .collect();
        wr.uint32(u32::try_from(persistable.len()).unwrap_or(u32::MAX));
        for (id, body) in &persistable {
            wr.uint32(registry.index_of(*id));
            self.save_body(wr, body, registry);
        }

        let player = self.player().map_or(0, |id| registry.index_of(id));
        wr.uint32(player);

        info!(
            target: "starbridge::save",
            bodies = persistable.len(),
            time = self.game_time(),
            "saved space"
        );
    }

    fn save_body(&self, wr: &mut Writer, body: &Body, registry: &mut dyn EntityRegistry) {
        wr.uint32(type_code(body.object_type()));
        wr.string(&body.label);
        for axis in body.position {
            wr.double(axis);
        }

        let path = body
            .sbody
            .zip(self.current_system())
            .and_then(|(sbody, system)| system.path_of(sbody));
        match path {
            Some(path) => {
                wr.bool(true);
                path.serialize(wr);
            }
            None => wr.bool(false),
        }

        match &body.data {
            BodyData::Ship(ship) | BodyData::Player(ship) => {
                wr.string(&ship.ship_type);
                wr.int64(ship.money);
                let docked = ship
                    .docked_with
                    .filter(|&id| self.exists(id))
                    .map_or(0, |id| registry.index_of(id));
                wr.uint32(docked);
                match ship.flight {
                    FlightState::Flying => wr.bool(false),
                    FlightState::Hyperspace { arrival } => {
                        wr.bool(true);
                        wr.double(arrival);
                    }
                }
            }
            BodyData::SpaceStation(station) => {
                wr.uint32(u32::try_from(station.adverts().len()).unwrap_or(u32::MAX));
                for advert in station.adverts() {
                    wr.string(&advert.module);
                    wr.int32(advert.reference);
                    wr.string(&advert.description);
                }
            }
            BodyData::CargoBody(commodity) => wr.string(commodity),
            BodyData::Planet | BodyData::Star | BodyData::Projectile => {}
        }
    }

    /// Replaces the contents of this space with a saved record.
    ///
    /// The whole record is parsed before anything is touched, so a malformed
    /// record leaves the space as it was. On success every previous body has
    /// been killed (notifying its subscribers), the saved system has been
    /// regenerated, and `index` maps each saved index to its new body.
    ///
    /// # Errors
    ///
    /// Returns a malformed-record error if the record does not parse or its
    /// indices are zero, repeated, or name a non-player as the player, or
    /// `NotFound` if the generator has no system at the saved location.
    pub fn load(
        &mut self,
        rd: &mut Reader<'_>,
        generator: &dyn SystemGenerator,
        index: &mut BodyIndex,
    ) -> Result<()> {
        let game_time = rd.double()?;
        let system = if rd.bool()? {
            let loc = SysLoc::unserialize(rd)?;
            let system = generator
                .generate(&loc)
                .ok_or_else(|| Error::not_found(format!("star system at {loc}")))?;
            Some(system)
        } else {
            None
        };

        let count = rd.uint32()?;
        let mut pending = Vec::with_capacity(count.min(4096) as usize);
        for _ in 0..count {
            pending.push(read_body(rd, system.as_ref())?);
        }
        let player = rd.uint32()?;
        check_links(&pending, player)?;

        self.clear();
        index.clear();
        self.set_game_time(game_time);
        match system {
            Some(system) => self.set_current_system(system),
            None => self.unload_system(),
        }

        let mut docked = Vec::new();
        for PendingBody {
            index: saved,
            body,
            docked_with,
        } in pending
        {
            let id = self.add_body(body);
            index.bind(saved, id)?;
            if docked_with != 0 {
                docked.push((id, docked_with));
            }
        }
        for (ship, station) in docked {
            self.relink_docking(ship, index.entity_at(station));
        }
        if let Some(id) = index.entity_at(player) {
            self.set_player(id)?;
        }

        info!(
            target: "starbridge::save",
            bodies = self.len(),
            time = game_time,
            "restored space"
        );
        Ok(())
    }

    fn relink_docking(&mut self, ship: BodyId, station: Option<BodyId>) {
        let Some(station) = station else {
            warn!(
                target: "starbridge::save",
                body = ?ship,
                "docked with a body that was not saved"
            );
            return;
        };
        if let Err(err) = self.dock(ship, station) {
            warn!(target: "starbridge::save", body = ?ship, %err, "dropped docking link");
        }
    }
}

/// Rejects index tables the restore loop could not bind.
fn check_links(pending: &[PendingBody], player: u32) -> Result<()> {
    let mut seen = HashSet::with_capacity(pending.len());
    for body in pending {
        if body.index == 0 || !seen.insert(body.index) {
            return Err(Error::malformed(
                "unique body index above 0",
                body.index.to_string(),
            ));
        }
    }
    if player != 0
        && !pending
            .iter()
            .any(|p| p.index == player && matches!(p.body.data, BodyData::Player(_)))
    {
        return Err(Error::malformed("index of a saved player", player.to_string()));
    }
    Ok(())
}

fn read_body(rd: &mut Reader<'_>, system: Option<&StarSystem>) -> Result<PendingBody> {
    let index = rd.uint32()?;
    let code = rd.uint32()?;
    let label = rd.string()?;
    let position = [rd.double()?, rd.double()?, rd.double()?];

    let sbody = if rd.bool()? {
        let path = SBodyPath::unserialize(rd)?;
        match system.map(|s| path.resolve(s)) {
            Some(Ok(id)) => Some(id),
            Some(Err(err)) => {
                warn!(target: "starbridge::save", %label, %err, "static body no longer resolves");
                None
            }
            None => None,
        }
    } else {
        None
    };

    let mut docked_with = 0;
    let data = match code {
        1 | 2 => {
            let mut ship = ShipData::new(rd.string()?);
            ship.money = rd.int64()?;
            docked_with = rd.uint32()?;
            if rd.bool()? {
                ship.flight = FlightState::Hyperspace {
                    arrival: rd.double()?,
                };
            }
            if code == 1 {
                BodyData::Ship(ship)
            } else {
                BodyData::Player(ship)
            }
        }
        3 => {
            let mut station = StationData::default();
            for _ in 0..rd.uint32()? {
                station.add_advert(BBAdvert {
                    module: rd.string()?,
                    reference: rd.int32()?,
                    description: rd.string()?,
                });
            }
            BodyData::SpaceStation(station)
        }
        4 => BodyData::Planet,
        5 => BodyData::Star,
        6 => BodyData::CargoBody(rd.string()?),
        other => return Err(Error::malformed("body type code 1-6", other.to_string())),
    };

    debug!(target: "starbridge::save", index, %label, "read body");
    Ok(PendingBody {
        index,
        body: Body {
            label,
            position,
            sbody,
            data,
        },
        docked_with,
    })
}
