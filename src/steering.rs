//! Alignment, cohesion and separation.
//!
//! Each rule looks at its own circle around the boid, so the three neighborhoods are queried
//! independently even when their radii coincide.
use crate::error::FlockError;
use crate::flock::{Boid, BoidId};
use crate::geometry::{Circle, Point};
use crate::quadtree::Quadtree;
use crate::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SteeringParams {
    pub alignment_radius: f32,
    pub alignment_weight: f32,
    pub cohesion_radius: f32,
    pub cohesion_weight: f32,
    pub separation_radius: f32,
    pub separation_weight: f32,
    /// Lower bound for the neighbor distance in the separation rule.
    /// `0.0` leaves the distance untouched, and a neighbor sitting exactly on top of the boid then
    /// yields a non-finite force.
    pub min_separation: f32,
}

impl Default for SteeringParams {
    fn default() -> Self {
        Self {
            alignment_radius: 40.0,
            alignment_weight: 1.0,
            cohesion_radius: 40.0,
            cohesion_weight: 0.1,
            separation_radius: 20.0,
            separation_weight: 10.0,
            min_separation: 0.0,
        }
    }
}

impl SteeringParams {
    pub fn validate(&self) -> Result<(), FlockError> {
        let radii = [
            ("alignment_radius", self.alignment_radius),
            ("cohesion_radius", self.cohesion_radius),
            ("separation_radius", self.separation_radius),
            ("min_separation", self.min_separation),
        ];
        for (name, r) in radii.iter() {
            if !r.is_finite() || *r < 0.0 {
                return Err(FlockError::InvalidConfig(format!(
                    "{} must be finite and non-negative, got {}",
                    name, r
                )));
            }
        }
        let weights = [
            ("alignment_weight", self.alignment_weight),
            ("cohesion_weight", self.cohesion_weight),
            ("separation_weight", self.separation_weight),
        ];
        for (name, w) in weights.iter() {
            if !w.is_finite() {
                return Err(FlockError::InvalidConfig(format!(
                    "{} must be finite, got {}",
                    name, w
                )));
            }
        }
        Ok(())
    }
}

/// Steering force of `subject` given the index built from `boids` this step.
///
/// Indexed points are resolved to boids through their owner handle; points without an owner, or
/// with a handle `boids` does not know, are ignored. Neither the boids nor the index are modified,
/// the caller applies the result as the boid's acceleration.
///
/// Alignment and cohesion average over the boids they resolve. The separation sum is divided by
/// the size of the separation query result, which counts the subject itself and any unowned
/// points. Note that `separation_weight` scales each repulsion and then the separation term as a
/// whole.
pub fn compute_steering(
    subject: BoidId,
    boids: &[Boid],
    index: &Quadtree,
    params: &SteeringParams,
) -> Result<Vec2, FlockError> {
    let mut scratch = Vec::new();
    steer_with(subject, boids, index, params, &mut scratch)
}

/// Same as [`compute_steering`], reusing `scratch` for the query results.
pub(crate) fn steer_with(
    subject: BoidId,
    boids: &[Boid],
    index: &Quadtree,
    params: &SteeringParams,
    scratch: &mut Vec<Point>,
) -> Result<Vec2, FlockError> {
    let me = boids
        .get(subject.index())
        .ok_or(FlockError::UnknownBoid(subject))?;

    scratch.clear();
    index.query_circle_into(&Circle::around(me.position, params.alignment_radius), scratch);
    let alignment = mean(resolved(boids, scratch).map(|(_, b)| b.velocity))
        .map_or(Vec2::ZERO, |v| v - me.velocity);

    scratch.clear();
    index.query_circle_into(&Circle::around(me.position, params.cohesion_radius), scratch);
    let cohesion = mean(resolved(boids, scratch).map(|(_, b)| b.position))
        .map_or(Vec2::ZERO, |p| p - me.position);

    // the repulsion sum is averaged over the whole result set, the subject and unowned points
    // included
    scratch.clear();
    index.query_circle_into(&Circle::around(me.position, params.separation_radius), scratch);
    let mut separation = resolved(boids, scratch)
        .filter(|(id, _)| *id != subject)
        .fold(Vec2::ZERO, |sum, (_, b)| {
            let away = me.position - b.position;
            let dist = away.length().max(params.min_separation);
            sum + away * (params.separation_weight / dist)
        });
    if !scratch.is_empty() {
        separation = separation / scratch.len() as f32;
    }

    Ok(alignment * params.alignment_weight
        + cohesion * params.cohesion_weight
        + separation * params.separation_weight)
}

fn resolved<'a>(
    boids: &'a [Boid],
    points: &'a [Point],
) -> impl Iterator<Item = (BoidId, &'a Boid)> + 'a {
    points.iter().filter_map(move |p| {
        let id = p.owner?;
        boids.get(id.index()).map(|b| (id, b))
    })
}

fn mean<It>(it: It) -> Option<Vec2>
where
    It: Iterator<Item = Vec2>,
{
    let (sum, count) = it.fold((Vec2::ZERO, 0u32), |(sum, n), v| (sum + v, n + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> Quadtree {
        Quadtree::new(0.0, 0.0, 100.0, 100.0)
    }

    fn index_of(boids: &[Boid]) -> Quadtree {
        let mut index = world();
        for (i, b) in boids.iter().enumerate() {
            index
                .insert(Point::with_owner(b.position[0], b.position[1], BoidId(i as u32)))
                .unwrap();
        }
        index
    }

    fn only(weight: fn(&mut SteeringParams)) -> SteeringParams {
        let mut params = SteeringParams {
            alignment_radius: 20.0,
            alignment_weight: 0.0,
            cohesion_radius: 20.0,
            cohesion_weight: 0.0,
            separation_radius: 20.0,
            separation_weight: 0.0,
            min_separation: 0.0,
        };
        weight(&mut params);
        params
    }

    fn assert_close(a: Vec2, b: Vec2) {
        assert!(
            (a[0] - b[0]).abs() < 1e-5 && (a[1] - b[1]).abs() < 1e-5,
            "{:?} != {:?}",
            a,
            b
        );
    }

    #[test]
    fn lone_boid_feels_no_force() {
        let boids = vec![Boid::new(Vec2::new(3.0, 4.0), Vec2::new(1.0, -2.0))];
        let index = index_of(&boids);

        let params = SteeringParams::default();
        let force = compute_steering(BoidId(0), &boids, &index, &params).unwrap();

        assert_eq!(force, Vec2::ZERO);
    }

    #[test]
    fn far_neighbors_are_ignored() {
        let boids = vec![
            Boid::new(Vec2::new(-90.0, -90.0), Vec2::new(1.0, 0.0)),
            Boid::new(Vec2::new(90.0, 90.0), Vec2::new(0.0, 5.0)),
        ];
        let index = index_of(&boids);

        let params = SteeringParams::default();
        let force = compute_steering(BoidId(0), &boids, &index, &params).unwrap();

        assert_eq!(force, Vec2::ZERO);
    }

    #[test]
    fn alignment_steers_towards_mean_velocity() {
        let boids = vec![
            Boid::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)),
            Boid::new(Vec2::new(10.0, 0.0), Vec2::new(0.0, 1.0)),
        ];
        let index = index_of(&boids);
        let params = only(|p| p.alignment_weight = 2.0);

        let force = compute_steering(BoidId(0), &boids, &index, &params).unwrap();

        // mean velocity (0.5, 0.5) minus own (1, 0), doubled
        assert_close(force, Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn cohesion_steers_towards_mean_position() {
        let boids = vec![
            Boid::new(Vec2::new(0.0, 0.0), Vec2::ZERO),
            Boid::new(Vec2::new(10.0, 0.0), Vec2::ZERO),
            Boid::new(Vec2::new(0.0, 6.0), Vec2::ZERO),
        ];
        let index = index_of(&boids);
        let params = only(|p| p.cohesion_weight = 1.0);

        let force = compute_steering(BoidId(0), &boids, &index, &params).unwrap();

        assert_close(force, Vec2::new(10.0 / 3.0, 2.0));
    }

    #[test]
    fn separation_weight_is_applied_twice() {
        let boids = vec![
            Boid::new(Vec2::new(0.0, 0.0), Vec2::ZERO),
            Boid::new(Vec2::new(10.0, 0.0), Vec2::ZERO),
        ];
        let index = index_of(&boids);
        let params = only(|p| p.separation_weight = 2.0);

        let force = compute_steering(BoidId(0), &boids, &index, &params).unwrap();

        // (-10, 0) * 2 / 10 = (-2, 0), averaged over both boids in the circle, then weighted again
        assert_close(force, Vec2::new(-2.0, 0.0));
    }

    #[test]
    fn separation_averages_over_neighbors() {
        let boids = vec![
            Boid::new(Vec2::new(0.0, 0.0), Vec2::ZERO),
            Boid::new(Vec2::new(5.0, 0.0), Vec2::ZERO),
            Boid::new(Vec2::new(0.0, -10.0), Vec2::ZERO),
        ];
        let index = index_of(&boids);
        let params = only(|p| p.separation_weight = 1.0);

        let force = compute_steering(BoidId(0), &boids, &index, &params).unwrap();

        // unit pushes (-1, 0) and (0, 1), averaged over the three boids in the circle
        assert_close(force, Vec2::new(-1.0 / 3.0, 1.0 / 3.0));
    }

    #[test]
    fn separation_divides_by_the_query_result_count() {
        let boids = vec![
            Boid::new(Vec2::new(0.0, 0.0), Vec2::ZERO),
            Boid::new(Vec2::new(10.0, 0.0), Vec2::ZERO),
        ];
        let mut index = index_of(&boids);
        let params = only(|p| p.separation_weight = 1.0);

        let force = compute_steering(BoidId(0), &boids, &index, &params).unwrap();
        assert_close(force, Vec2::new(-0.5, 0.0));

        // unowned points push nothing but still count
        index.insert(Point::new(0.0, 5.0)).unwrap();
        index.insert(Point::with_owner(-5.0, 0.0, BoidId(42))).unwrap();

        let force = compute_steering(BoidId(0), &boids, &index, &params).unwrap();
        assert_close(force, Vec2::new(-0.25, 0.0));
    }

    #[test]
    fn separation_excludes_the_boid_itself() {
        let boids = vec![Boid::new(Vec2::new(1.0, 1.0), Vec2::ZERO)];
        let index = index_of(&boids);
        let params = only(|p| p.separation_weight = 10.0);

        let force = compute_steering(BoidId(0), &boids, &index, &params).unwrap();

        assert!(force.is_finite());
        assert_eq!(force, Vec2::ZERO);
    }

    #[test]
    fn coincident_neighbor_is_not_finite_without_clamp() {
        let boids = vec![
            Boid::new(Vec2::new(1.0, 1.0), Vec2::ZERO),
            Boid::new(Vec2::new(1.0, 1.0), Vec2::ZERO),
        ];
        let index = index_of(&boids);

        let params = only(|p| p.separation_weight = 1.0);
        let force = compute_steering(BoidId(0), &boids, &index, &params).unwrap();
        assert!(!force.is_finite());

        let params = only(|p| {
            p.separation_weight = 1.0;
            p.min_separation = 0.5;
        });
        let force = compute_steering(BoidId(0), &boids, &index, &params).unwrap();
        assert_eq!(force, Vec2::ZERO);
    }

    #[test]
    fn radii_are_independent() {
        let boids = vec![
            Boid::new(Vec2::new(0.0, 0.0), Vec2::ZERO),
            Boid::new(Vec2::new(30.0, 0.0), Vec2::ZERO),
        ];
        let index = index_of(&boids);
        let params = SteeringParams {
            cohesion_radius: 40.0,
            cohesion_weight: 1.0,
            separation_radius: 20.0,
            separation_weight: 1.0,
            ..only(|_| {})
        };

        let force = compute_steering(BoidId(0), &boids, &index, &params).unwrap();

        // the neighbor is inside the cohesion circle only
        assert_close(force, Vec2::new(15.0, 0.0));
    }

    #[test]
    fn unowned_points_are_skipped() {
        let boids = vec![Boid::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0))];
        let mut index = index_of(&boids);
        index.insert(Point::new(2.0, 2.0)).unwrap();
        index.insert(Point::with_owner(3.0, 3.0, BoidId(99))).unwrap();

        let params = SteeringParams::default();
        let force = compute_steering(BoidId(0), &boids, &index, &params).unwrap();

        assert_eq!(force, Vec2::ZERO);
    }

    #[test]
    fn unknown_subject_is_an_error() {
        let boids = vec![Boid::new(Vec2::ZERO, Vec2::ZERO)];
        let index = index_of(&boids);

        let err = compute_steering(BoidId(3), &boids, &index, &SteeringParams::default());

        assert_eq!(err, Err(FlockError::UnknownBoid(BoidId(3))));
    }

    #[test]
    fn default_params_are_valid() {
        assert!(SteeringParams::default().validate().is_ok());

        let bad = SteeringParams {
            separation_radius: -1.0,
            ..SteeringParams::default()
        };
        assert!(matches!(bad.validate(), Err(FlockError::InvalidConfig(_))));

        let bad = SteeringParams {
            cohesion_weight: f32::NAN,
            ..SteeringParams::default()
        };
        assert!(bad.validate().is_err());
    }
}
