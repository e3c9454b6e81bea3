//! Communication links between avatar pairs

use std::time::Duration;

use glam::Vec3;

/// Link line color
pub const LINK_COLOR: u32 = 0x88_DD_FF;

/// Opacity gained per second while active
pub const FADE_IN_RATE: f32 = 3.0;

/// Opacity lost per second while inactive
pub const FADE_OUT_RATE: f32 = 1.2;

/// A line between two avatars that glows while active
#[derive(Clone, Debug, PartialEq)]
pub struct CommunicationLink {
    a: usize,
    b: usize,
    active_until: Option<Duration>,
    opacity: f32,
    endpoints: [Vec3; 2],
}

impl CommunicationLink {
    /// Create an inactive link; the pair is stored in ascending order
    #[must_use]
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            a: a.min(b),
            b: a.max(b),
            active_until: None,
            opacity: 0.0,
            endpoints: [Vec3::ZERO; 2],
        }
    }

    /// The avatar indices, smaller first
    #[must_use]
    pub fn pair(&self) -> (usize, usize) {
        (self.a, self.b)
    }

    /// Whether the link connects exactly `x` and `y`, in either order
    #[must_use]
    pub fn connects(&self, x: usize, y: usize) -> bool {
        (self.a, self.b) == (x.min(y), x.max(y))
    }

    /// Activate until `now + timeout`; re-triggering extends the window
    pub fn activate(&mut self, now: Duration, timeout: Duration) {
        self.active_until = Some(now + timeout);
    }

    /// Whether the link is inside its active window
    #[must_use]
    pub fn is_active(&self, now: Duration) -> bool {
        self.active_until.is_some_and(|until| now < until)
    }

    /// Current opacity in `[0, 1]`
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Endpoints sampled on the last update
    #[must_use]
    pub fn endpoints(&self) -> [Vec3; 2] {
        self.endpoints
    }

    /// Ease opacity and re-sample endpoints from live avatar positions
    pub fn update(&mut self, dt: f32, now: Duration, positions: &[Vec3]) {
        if self.active_until.is_some() && !self.is_active(now) {
            self.active_until = None;
        }
        self.opacity = if self.is_active(now) {
            (self.opacity + FADE_IN_RATE * dt).min(1.0)
        } else {
            (self.opacity - FADE_OUT_RATE * dt).max(0.0)
        };
        if let (Some(&pa), Some(&pb)) = (positions.get(self.a), positions.get(self.b)) {
            self.endpoints = [pa, pb];
        }
    }
}

/// One link per unordered avatar pair
#[derive(Clone, Debug, Default)]
pub struct LinkSet {
    links: Vec<CommunicationLink>,
}

impl LinkSet {
    /// Build links for every pair among `count` avatars
    #[must_use]
    pub fn for_avatars(count: usize) -> Self {
        let links = (0..count)
            .flat_map(|i| (i + 1..count).map(move |j| CommunicationLink::new(i, j)))
            .collect();
        Self { links }
    }

    /// Number of links
    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether there are no links
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Iterate over links
    pub fn iter(&self) -> impl Iterator<Item = &CommunicationLink> {
        self.links.iter()
    }

    /// Link by index
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&CommunicationLink> {
        self.links.get(index)
    }

    /// Index of the link joining `x` and `y`, in either order
    #[must_use]
    pub fn find(&self, x: usize, y: usize) -> Option<usize> {
        if x == y {
            return None;
        }
        self.links.iter().position(|link| link.connects(x, y))
    }

    /// Activate the link at `index`; returns its pair
    pub fn activate(&mut self, index: usize, now: Duration, timeout: Duration) -> Option<(usize, usize)> {
        let link = self.links.get_mut(index)?;
        link.activate(now, timeout);
        Some(link.pair())
    }

    /// Activate the link joining `x` and `y`
    pub fn activate_between(
        &mut self,
        x: usize,
        y: usize,
        now: Duration,
        timeout: Duration,
    ) -> Option<(usize, usize)> {
        let index = self.find(x, y)?;
        self.activate(index, now, timeout)
    }

    /// Update every link
    pub fn update(&mut self, dt: f32, now: Duration, positions: &[Vec3]) {
        for link in &mut self.links {
            link.update(dt, now, positions);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(2000);

    #[test]
    fn test_one_link_per_pair() {
        let links = LinkSet::for_avatars(7);
        assert_eq!(links.len(), 21);
        assert_eq!(links.find(3, 5), links.find(5, 3));
        assert!(links.find(4, 4).is_none());
        assert!(links.find(2, 9).is_none());
    }

    #[test]
    fn test_fade_in_then_out() {
        let mut link = CommunicationLink::new(0, 1);
        let positions = [Vec3::ZERO, Vec3::X];
        let step = Duration::from_millis(100);
        let mut now = Duration::ZERO;
        link.activate(now, TIMEOUT);

        let mut previous = link.opacity();
        while link.is_active(now) {
            link.update(0.1, now, &positions);
            if previous < 1.0 {
                assert!(link.opacity() > previous);
            }
            assert!(link.opacity() <= 1.0);
            previous = link.opacity();
            now += step;
        }
        assert!((previous - 1.0).abs() < f32::EPSILON);

        while link.opacity() > 0.0 {
            link.update(0.1, now, &positions);
            assert!(link.opacity() < previous);
            assert!(link.opacity() >= 0.0);
            previous = link.opacity();
            now += step;
        }
        assert_eq!(link.endpoints(), [Vec3::ZERO, Vec3::X]);
    }

    #[test]
    fn test_retrigger_extends_window() {
        let mut link = CommunicationLink::new(2, 1);
        assert_eq!(link.pair(), (1, 2));
        link.activate(Duration::ZERO, TIMEOUT);
        link.activate(Duration::from_millis(1500), TIMEOUT);
        assert!(link.is_active(Duration::from_millis(3000)));
        assert!(!link.is_active(Duration::from_millis(3500)));
    }
}
