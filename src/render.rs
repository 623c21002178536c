use std::thread;
use std::sync::mpsc;
use std::sync::{ Arc, Mutex };

use crate::camera::Viewport;
use crate::canvas::Canvas;
use crate::color::Color;
use crate::error::Result;
use crate::scene::Scene;
use crate::texture::TextureSet;
use crate::trace::{ TraceContext, Tracer };

/// Renders the scene on the calling thread.
///
/// The viewport is derived first, so a degenerate camera basis or a
/// zero image dimension fails before any pixel is traced. Each pixel's
/// primary ray is traced to a color, clamped once, and written to the
/// canvas.
pub fn render(scene: &Scene, textures: &TextureSet) -> Result<Canvas> {
    let viewport = Viewport::new(scene)?;
    let tracer = Tracer::new(scene, textures);

    let mut canvas = Canvas::new(viewport.width, viewport.height);

    for y in 0..viewport.height {
        for x in 0..viewport.width {
            let ray = viewport.ray_for_pixel(x, y);
            let color = tracer.trace(&ray, TraceContext::primary()).clamp();
            canvas.write_pixel(x, y, color);
        }
    }

    Ok(canvas)
}

pub enum Message {
    Row(usize),
    Terminate,
}

struct Worker {
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    fn new(
        scene: Arc<Scene>,
        textures: Arc<TextureSet>,
        viewport: Arc<Viewport>,
        canvas: Arc<Mutex<Canvas>>,
        receiver: Arc<Mutex<mpsc::Receiver<Message>>>,
    ) -> Worker {
        let thread = thread::spawn(move || {
            let tracer = Tracer::new(&scene, &textures);

            loop {
                let message: Message = receiver.lock().unwrap().recv().unwrap();

                match message {
                    Message::Row(y) => {
                        // Trace the whole row before taking the canvas
                        // lock once.
                        let row: Vec<Color> = (0..viewport.width)
                            .map(|x| {
                                let ray = viewport.ray_for_pixel(x, y);
                                tracer.trace(&ray, TraceContext::primary()).clamp()
                            })
                            .collect();

                        let mut canvas = canvas.lock().unwrap();
                        for (x, color) in row.into_iter().enumerate() {
                            canvas.write_pixel(x, y, color);
                        }
                    },

                    Message::Terminate => {
                        break;
                    }
                }
            }
        });

        Worker { thread: Some(thread) }
    }
}

pub struct ThreadPool {
    workers: Vec<Worker>,
    sender: mpsc::Sender<Message>,
}

impl ThreadPool {
    pub fn new(
        size: usize,
        scene: Scene,
        textures: TextureSet,
        viewport: Viewport,
        canvas: Arc<Mutex<Canvas>>,
    ) -> ThreadPool {
        // There should be at least one thread to run workers.
        assert!(size > 0);

        let (sender, receiver) = mpsc::channel();

        let scene = Arc::new(scene);
        let textures = Arc::new(textures);
        let viewport = Arc::new(viewport);
        let receiver = Arc::new(Mutex::new(receiver));

        let mut workers = Vec::with_capacity(size);

        for _ in 0..size {
            workers.push(Worker::new(
                Arc::clone(&scene),
                Arc::clone(&textures),
                Arc::clone(&viewport),
                Arc::clone(&canvas),
                Arc::clone(&receiver),
            ));
        }

        ThreadPool { workers, sender }
    }

    pub fn execute(&mut self, message: Message) {
        self.sender.send(message).unwrap();
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        for _ in &self.workers {
            self.sender.send(Message::Terminate).unwrap();
        }

        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                thread.join().unwrap();
            }
        }
    }
}

/// Renders the scene across a pool of worker threads, one image row per
/// work item.
pub fn render_parallel(
    scene: Scene,
    textures: TextureSet,
    threads: usize,
) -> Result<Canvas> {
    let viewport = Viewport::new(&scene)?;
    let height = viewport.height;

    let canvas = Arc::new(Mutex::new(Canvas::new(viewport.width, height)));

    log::info!("rendering {}x{} with {} threads", viewport.width, height, threads);
    {
        let mut pool = ThreadPool::new(
            threads, scene, textures, viewport, Arc::clone(&canvas)
        );

        for y in 0..height {
            pool.execute(Message::Row(y));
        }
    }

    // All workers have joined; the canvas has no other owners left.
    let canvas = match Arc::try_unwrap(canvas) {
        Ok(mutex) => mutex.into_inner().unwrap(),
        Err(arc) => arc.lock().unwrap().clone(),
    };

    Ok(canvas)
}

/* Tests */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TracerError;
    use crate::light::Light;
    use crate::material::Material;
    use crate::scene::Sphere;
    use crate::vector::{ Point3, Vector3 };

    fn lit_sphere_scene(width: usize, height: usize) -> Scene {
        let mut scene = Scene::default();
        scene.eye = Point3::origin();
        scene.view_dir = Vector3::new(0.0, 0.0, -1.0);
        scene.up_dir = Vector3::new(0.0, 1.0, 0.0);
        scene.vfov = 90.0;
        scene.width = width;
        scene.height = height;
        scene.background = Color::black();

        scene.materials.push(Material {
            diffuse: Color::rgb(1.0, 0.0, 0.0),
            specular: Color::white(),
            ka: 0.2,
            kd: 0.8,
            ks: 0.0,
            falloff: 10.0,
            alpha: 1.0,
            eta: 1.0,
            texture: None,
        });
        scene.spheres.push(Sphere {
            center: Point3::new(0.0, 0.0, -5.0),
            radius: 1.0,
            material: 0,
        });
        scene.lights.push(Light::Directional {
            direction: Vector3::new(0.0, 0.0, -1.0),
            color: Color::white(),
        });

        scene
    }

    #[test]
    fn lit_sphere_renders_a_centered_disc() {
        let scene = lit_sphere_scene(100, 100);
        let canvas = render(&scene, &TextureSet::empty()).unwrap();

        // Head-on hit near the image center: ambient plus the full
        // diffuse term.
        let center = canvas.pixel_at(50, 50);
        assert!(center.r > 0.9);
        assert!(center.g < 0.01 && center.b < 0.01);

        // The sphere subtends only a couple dozen pixels; the corners
        // and the row well above center see the background.
        assert_eq!(canvas.pixel_at(0, 0), Color::black());
        assert_eq!(canvas.pixel_at(99, 99), Color::black());
        assert_eq!(canvas.pixel_at(50, 10), Color::black());
    }

    #[test]
    fn degenerate_camera_renders_nothing() {
        let mut scene = lit_sphere_scene(10, 10);
        scene.up_dir = scene.view_dir;

        assert!(matches!(
            render(&scene, &TextureSet::empty()),
            Err(TracerError::DegenerateBasis)
        ));
    }

    #[test]
    fn parallel_render_matches_single_threaded() {
        let scene = lit_sphere_scene(24, 16);

        let single = render(&scene, &TextureSet::empty()).unwrap();
        let parallel = render_parallel(scene, TextureSet::empty(), 3).unwrap();

        assert_eq!(single, parallel);
    }
}
