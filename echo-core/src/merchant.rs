//! Trading with the wandering merchant.

use crate::items::{self, Potion};
use crate::narration::Pause;
use crate::rules::{Effect, Rejection, Resolution};
use crate::world::{GameMode, GameWorld, Player, RoomType};
use log::debug;

/// Fraction of a treasure's value the merchant pays.
pub const SELL_RATE: f64 = 0.75;

fn plural(name: &str, quantity: usize) -> String {
    if quantity > 1 {
        format!("{}s", name)
    } else {
        name.to_string()
    }
}

/// Open trading in a merchant room.
pub fn talk(world: &mut GameWorld, out: &mut Resolution) -> Result<(), Rejection> {
    match world.current_room() {
        Some(room) if room.room_type == RoomType::Merchant => {}
        _ => return Err(Rejection::NoMerchant),
    }

    world.mode = GameMode::Merchant;
    out.record(Effect::ModeChanged {
        mode: GameMode::Merchant,
    });
    out.narrate(
        "A sassy merchant greets you: \"Well, well, a customer! What do you want? Say what do you have, buy, sell, or leave.\"",
    );
    Ok(())
}

pub fn list_wares(out: &mut Resolution) {
    out.narrate_with("The merchant smirks: \"Here's my stock:\"", Pause::Short);
    for potion in Potion::all() {
        out.narrate_with(
            format!("{} for {} gold.", potion.name(), potion.price()),
            Pause::Short,
        );
    }
    out.narrate("Say buy followed by the item and quantity, sell an item, or leave.");
}

/// Buy `quantity` potions of one kind.
pub fn buy(
    player: &mut Player,
    potion: Option<Potion>,
    quantity: u32,
    out: &mut Resolution,
) -> Result<(), Rejection> {
    let potion = potion.ok_or(Rejection::UnknownWares)?;
    let quantity = quantity.max(1);
    let cost = potion.price() * quantity;
    if player.gold < cost {
        return Err(Rejection::NotEnoughGold {
            have: player.gold,
            cost,
        });
    }

    player.gold -= cost;
    out.record(Effect::GoldChanged {
        amount: -(cost as i64),
        total: player.gold,
    });
    for _ in 0..quantity {
        player.add_item(potion.name());
        out.record(Effect::ItemAdded {
            name: potion.name().to_string(),
        });
    }
    debug!("Bought {} x{} for {} gold", potion, quantity, cost);

    out.narrate(format!(
        "The merchant sneers, \"Fine, {} {} for {} gold.\" Gold remaining: {}.",
        quantity,
        plural(potion.name(), quantity as usize),
        cost,
        player.gold
    ));
    Ok(())
}

/// Sell `quantity` of a carried treasure at [`SELL_RATE`] of its value.
pub fn sell(
    player: &mut Player,
    treasure: Option<&str>,
    quantity: u32,
    out: &mut Resolution,
) -> Result<(), Rejection> {
    let treasure = treasure
        .and_then(items::get_treasure)
        .ok_or(Rejection::UnknownTreasure)?;
    let quantity = quantity.max(1);

    let have = player.item_count(treasure.name);
    if have < quantity as usize {
        return Err(Rejection::NotEnoughToSell {
            name: plural(treasure.name, have),
            have,
        });
    }

    let total = (treasure.value as f64 * quantity as f64 * SELL_RATE).floor() as u32;
    for _ in 0..quantity {
        player.take_item(treasure.name);
        out.record(Effect::ItemRemoved {
            name: treasure.name.to_string(),
        });
    }
    player.gold += total;
    out.record(Effect::GoldChanged {
        amount: total as i64,
        total: player.gold,
    });
    debug!("Sold {} x{} for {} gold", treasure.name, quantity, total);

    out.narrate(format!(
        "The merchant chuckles, \"I'll take {} {} for {} gold.\" Gold: {}.",
        quantity,
        plural(treasure.name, quantity as usize),
        total,
        player.gold
    ));
    Ok(())
}

pub fn leave(world: &mut GameWorld, out: &mut Resolution) {
    world.mode = GameMode::Exploration;
    out.record(Effect::ModeChanged {
        mode: GameMode::Exploration,
    });
    out.narrate("You leave the merchant.");
}
