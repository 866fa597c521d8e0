//! Staggered-grid kernels moving quantities between nodes, elements and
//! Voronoi regions of a discretised rod.
//!
//! A rod with `n` elements has `n + 1` nodes and `n - 1` interior Voronoi
//! regions. All kernels accept empty inputs.

use crate::engine::math::Vec3;

/// Difference of a staggered quantity onto the next-larger grid.
///
/// `out[0] = in[0]`, `out[i] = in[i] - in[i-1]`, `out[n] = -in[n-1]`.
/// Used element→node (internal forces) and Voronoi→element (bend couples).
#[must_use]
pub fn difference(input: &[Vec3]) -> Vec<Vec3> {
    let mut out = vec![Vec3::zero(); input.len() + 1];
    for (i, v) in input.iter().enumerate() {
        out[i] += *v;
        out[i + 1] += -*v;
    }
    out
}

/// Trapezoidal average of a staggered quantity onto the next-larger grid.
///
/// `out[0] = in[0]/2`, `out[i] = (in[i-1] + in[i])/2`, `out[n] = in[n-1]/2`.
#[must_use]
pub fn quadrature(input: &[Vec3]) -> Vec<Vec3> {
    let mut out = vec![Vec3::zero(); input.len() + 1];
    for (i, v) in input.iter().enumerate() {
        let half = v.scale(0.5);
        out[i] += half;
        out[i + 1] += half;
    }
    out
}

/// Midpoint of adjacent nodes (node positions or velocities → elements).
#[must_use]
pub fn node_to_element(nodes: &[Vec3]) -> Vec<Vec3> {
    nodes
        .windows(2)
        .map(|w| (w[0] + w[1]).scale(0.5))
        .collect()
}

/// Lump nodal loads onto elements.
///
/// Interior nodes are shared half/half by their two elements, end nodes
/// belong entirely to their single element.
#[must_use]
pub fn nodes_to_elements(nodes: &[Vec3]) -> Vec<Vec3> {
    let n_elements = nodes.len().saturating_sub(1);
    (0..n_elements)
        .map(|i| {
            let left = if i == 0 { nodes[0] } else { nodes[i].scale(0.5) };
            let right = if i + 1 == n_elements {
                nodes[i + 1]
            } else {
                nodes[i + 1].scale(0.5)
            };
            left + right
        })
        .collect()
}

/// Spread an elemental load half/half onto its two nodes.
pub fn add_element_load_to_nodes(nodes: &mut [Vec3], element: usize, load: Vec3) {
    let half = load.scale(0.5);
    nodes[element] += half;
    nodes[element + 1] += half;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64) -> Vec3 {
        Vec3::new(x, 0.0, 0.0)
    }

    #[test]
    fn test_difference_telescopes_to_zero() {
        let out = difference(&[v(1.0), v(3.0), v(-2.0)]);
        assert_eq!(out.len(), 4);
        assert_eq!(out[0], v(1.0));
        assert_eq!(out[1], v(2.0));
        assert_eq!(out[2], v(-5.0));
        assert_eq!(out[3], v(2.0));
        let total: f64 = out.iter().map(|o| o.x).sum();
        assert!(total.abs() < f64::EPSILON);
    }

    #[test]
    fn test_difference_of_empty_is_single_zero() {
        assert_eq!(difference(&[]), vec![Vec3::zero()]);
    }

    #[test]
    fn test_quadrature_conserves_total() {
        let out = quadrature(&[v(2.0), v(4.0)]);
        assert_eq!(out, vec![v(1.0), v(3.0), v(2.0)]);
    }

    #[test]
    fn test_nodes_to_elements_conserves_total() {
        let nodes = [v(1.0), v(2.0), v(3.0), v(4.0)];
        let elements = nodes_to_elements(&nodes);
        assert_eq!(elements.len(), 3);
        let node_total: f64 = nodes.iter().map(|n| n.x).sum();
        let element_total: f64 = elements.iter().map(|e| e.x).sum();
        assert!((node_total - element_total).abs() < 1e-15);
        assert_eq!(elements[0], v(2.0));
        assert_eq!(elements[2], v(5.5));
    }

    #[test]
    fn test_nodes_to_elements_single_element() {
        let elements = nodes_to_elements(&[v(1.0), v(2.0)]);
        assert_eq!(elements, vec![v(3.0)]);
    }

    #[test]
    fn test_node_to_element_midpoints() {
        let mid = node_to_element(&[v(0.0), v(1.0), v(3.0)]);
        assert_eq!(mid, vec![v(0.5), v(2.0)]);
    }
}
