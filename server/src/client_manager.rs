//! Player slot management for a single game session
//!
//! A session seats exactly two players. This module tracks who holds each
//! seat: the tile they play, the address they connected from, the display
//! name they announced in their first handshake and whether they are still
//! part of the session.

use log::info;
use shared::Tile;
use std::net::SocketAddr;

pub const MAX_PLAYERS: usize = 2;

/// A seat bound to one connected player
#[derive(Debug, Clone)]
pub struct PlayerSlot {
    /// Seat ordinal, 0 for the first player to join
    pub slot: usize,
    pub tile: Tile,
    pub addr: SocketAddr,
    /// Announced by the player's first `Hello`; empty until then
    pub name: String,
    /// Cleared once the player has left or been removed
    pub alive: bool,
}

impl PlayerSlot {
    pub fn new(slot: usize, addr: SocketAddr) -> Self {
        Self {
            slot,
            tile: Tile::for_slot(slot),
            addr,
            name: String::new(),
            alive: true,
        }
    }
}

/// Seats players in join order and tracks which seats are still occupied
///
/// Slots are never reused within a session: a removed player keeps their
/// seat, marked as no longer alive, until the session ends or is reset.
#[derive(Debug, Default)]
pub struct ClientManager {
    slots: [Option<PlayerSlot>; MAX_PLAYERS],
    joined: usize,
}

impl ClientManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seats a new player and returns their slot, or None once both seats
    /// have been handed out.
    pub fn add_client(&mut self, addr: SocketAddr) -> Option<usize> {
        if self.joined >= MAX_PLAYERS {
            return None;
        }

        let slot = self.joined;
        self.joined += 1;

        let player = PlayerSlot::new(slot, addr);
        info!("Player {} ({}) joined from {}", slot + 1, player.tile, addr);
        self.slots[slot] = Some(player);

        Some(slot)
    }

    /// Marks a seated player as gone. Returns the player if they were still
    /// part of the session.
    pub fn remove_client(&mut self, slot: usize) -> Option<PlayerSlot> {
        let player = self
            .slots
            .get_mut(slot)?
            .as_mut()
            .filter(|p| p.alive)?;
        player.alive = false;
        info!("Player {} ({}) removed", slot + 1, player.tile);
        Some(player.clone())
    }

    /// Empties every seat so the next player to join takes the first one
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn get(&self, slot: usize) -> Option<&PlayerSlot> {
        self.slots.get(slot)?.as_ref()
    }

    pub fn is_connected(&self, slot: usize) -> bool {
        self.get(slot).is_some_and(|p| p.alive)
    }

    pub fn set_name(&mut self, slot: usize, name: &str) {
        if let Some(player) = self.slots.get_mut(slot).and_then(Option::as_mut) {
            player.name = name.to_string();
        }
    }

    /// Display name of a seat, empty if the seat is vacant or unnamed
    pub fn name(&self, slot: usize) -> String {
        self.get(slot).map(|p| p.name.clone()).unwrap_or_default()
    }

    pub fn tile(&self, slot: usize) -> Tile {
        self.get(slot).map(|p| p.tile).unwrap_or(Tile::for_slot(slot))
    }

    /// The other seat in a two-player session
    pub fn opponent(slot: usize) -> usize {
        1 - slot
    }

    pub fn connected_slots(&self) -> Vec<usize> {
        (0..MAX_PLAYERS).filter(|&s| self.is_connected(s)).collect()
    }

    /// Players still taking part
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().filter(|p| p.alive).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Both seats have been handed out at some point
    pub fn is_full(&self) -> bool {
        self.joined >= MAX_PLAYERS
    }
}
