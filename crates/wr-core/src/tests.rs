//! Unit tests for wr-core primitives.

#[cfg(test)]
mod ids {
    use crate::{NodeId, OperatorId, RouteId};

    #[test]
    fn ordering() {
        assert!(RouteId(1) < RouteId(2));
        assert!(NodeId(100) > NodeId(99));
    }

    #[test]
    fn display() {
        assert_eq!(NodeId(7).to_string(), "NodeId(7)");
        assert_eq!(OperatorId::from("op1").to_string(), "op1");
    }

    #[test]
    fn blank_operator() {
        assert!(OperatorId::new("  ").is_blank());
        assert!(!OperatorId::new("op1").is_blank());
    }
}

#[cfg(test)]
mod geo {
    use crate::GeoPoint;

    #[test]
    fn zero_distance() {
        let p = GeoPoint::new(4.8156, 7.0498);
        assert!(p.distance_km(p) < 1e-9);
    }

    #[test]
    fn one_degree_latitude() {
        // ~1 degree of latitude ≈ 111.19 km on a 6371 km sphere
        let a = GeoPoint::new(30.0, -88.0);
        let b = GeoPoint::new(31.0, -88.0);
        let d = a.distance_km(b);
        assert!((d - 111.195).abs() < 0.01, "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint::new(4.80, 7.00);
        let b = GeoPoint::new(4.85, 7.06);
        assert!((a.distance_km(b) - b.distance_km(a)).abs() < 1e-12);
    }

    #[test]
    fn midpoint_is_mean() {
        let m = GeoPoint::new(0.0, 0.0).midpoint(GeoPoint::new(0.0, 0.01));
        assert_eq!(m, GeoPoint::new(0.0, 0.005));
    }

    #[test]
    fn equator_hundredth_degree() {
        // 0.01° of longitude at the equator ≈ 1.112 km
        let d = GeoPoint::new(0.0, 0.0).distance_km(GeoPoint::new(0.0, 0.01));
        assert!((d - 1.112).abs() < 0.001, "got {d}");
    }
}

#[cfg(test)]
mod time {
    use crate::{Clock, ManualClock, SystemClock, Timestamp};

    #[test]
    fn manual_clock_steps() {
        let clock = ManualClock::new(Timestamp(1_000), 5);
        assert_eq!(clock.now(), Timestamp(1_000));
        assert_eq!(clock.now(), Timestamp(1_005));
        assert_eq!(clock.peek(), Timestamp(1_010));
        clock.set(Timestamp(0));
        assert_eq!(clock.now(), Timestamp::EPOCH);
    }

    #[test]
    fn system_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now() > Timestamp(1_577_836_800_000));
    }

    #[test]
    fn millis_since() {
        assert_eq!(Timestamp(50).millis_since(Timestamp(20)), 30);
    }
}
