//! `ObjectWrapper` userdata.

use mlua::{AnyUserData, MetaMethod, UserData, UserDataMethods};

use super::LuaSBodyPath;
use crate::handle::LiveHandle;

impl UserData for LiveHandle {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("IsEntity", |_, this, ()| Ok(this.is_entity()));
        methods.add_method("IsBody", |_, this, ()| Ok(this.is_body()));
        methods.add_method("IsShip", |_, this, ()| Ok(this.is_ship()));
        methods.add_method("IsSpaceStation", |_, this, ()| Ok(this.is_station()));
        methods.add_method("IsPlayer", |_, this, ()| Ok(this.is_player()));

        methods.add_method("GetLabel", |_, this, ()| Ok(this.label()));
        methods.add_method("GetMoney", |_, this, ()| Ok(this.money()));
        methods.add_method("SetMoney", |_, this, credits: f64| {
            this.set_money(credits);
            Ok(())
        });
        methods.add_method("GetDockedWith", |_, this, ()| Ok(this.docked_with()));
        methods.add_method("SetDockedWith", |_, this, station: Option<AnyUserData>| {
            match station {
                None => this.set_docked_with(None),
                Some(ud) => {
                    let station = ud.borrow::<LiveHandle>()?;
                    this.set_docked_with(Some(&*station));
                }
            }
            Ok(())
        });
        methods.add_method("GetSBody", |_, this, ()| {
            Ok(this.sbody_path().map(LuaSBodyPath))
        });

        methods.add_method(
            "SpaceStationAddAdvert",
            |_, this, (module, reference, description): (String, i32, String)| {
                this.add_advert(&module, reference, &description);
                Ok(())
            },
        );
        methods.add_method(
            "SpaceStationRemoveAdvert",
            |_, this, (module, reference): (String, i32)| {
                this.remove_advert(&module, reference);
                Ok(())
            },
        );

        methods.add_meta_method(MetaMethod::Eq, |_, this, other: AnyUserData| {
            Ok(other
                .borrow::<LiveHandle>()
                .is_ok_and(|other| this.same_referent(&other)))
        });
        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| Ok(this.to_string()));
    }
}
