use slotmap::new_key_type;

new_key_type! {
    /// Identifies a robot in the fleet. Unique for the lifetime of the
    /// simulation; robots are never removed, so slot order is arrival order.
    pub struct RobotId;
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn robot_ids_are_unique() {
        let mut fleet = SlotMap::<RobotId, ()>::with_key();
        let a = fleet.insert(());
        let b = fleet.insert(());
        assert_ne!(a, b);
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut fleet = SlotMap::<RobotId, ()>::with_key();
        let a = fleet.insert(());
        let mut map = HashMap::new();
        map.insert(a, "miner");
        assert_eq!(map[&a], "miner");
    }
}
