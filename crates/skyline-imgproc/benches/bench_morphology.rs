use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use skyline_image::Image;
use skyline_imgproc::morphology::{dilate, erode, open, Kernel, KernelShape};

use image::GrayImage;
use imageproc::distance_transform::Norm;

fn bench_morphology(c: &mut Criterion) {
    let mut group = c.benchmark_group("Morphology");

    for (width, height) in [(256, 224), (512, 448), (1024, 896)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{}x{}", width, height);

        // a noisy starfield-like input
        let image_data = (0..width * height)
            .map(|i| if i % 97 == 0 { 255u8 } else { 64 })
            .collect::<Vec<_>>();
        let image_size = [*width, *height].into();

        let image = Image::<u8, 1>::new(image_size, image_data.clone()).unwrap();
        let output = Image::<u8, 1>::from_size_val(image_size, 0).unwrap();

        let small = Kernel::new(KernelShape::Ellipse {
            width: 3,
            height: 3,
        });
        let large = Kernel::new(KernelShape::Ellipse {
            width: 20,
            height: 20,
        });

        group.bench_with_input(
            BenchmarkId::new("erode_ellipse3_x2", &parameter_string),
            &(&image, &output),
            |b, i| {
                let (src, mut dst) = (i.0, i.1.clone());
                b.iter(|| black_box(erode(src, &mut dst, &small, 2)))
            },
        );

        group.bench_with_input(
            BenchmarkId::new("dilate_ellipse3_x3", &parameter_string),
            &(&image, &output),
            |b, i| {
                let (src, mut dst) = (i.0, i.1.clone());
                b.iter(|| black_box(dilate(src, &mut dst, &small, 3)))
            },
        );

        group.bench_with_input(
            BenchmarkId::new("open_ellipse20", &parameter_string),
            &(&image, &output),
            |b, i| {
                let (src, mut dst) = (i.0, i.1.clone());
                b.iter(|| black_box(open(src, &mut dst, &large)))
            },
        );

        group.bench_with_input(
            BenchmarkId::new("erode_imageproc", &parameter_string),
            &image_data,
            |b, i| {
                let gray = GrayImage::from_raw(*width as u32, *height as u32, i.clone()).unwrap();
                b.iter(|| black_box(imageproc::morphology::erode(&gray, Norm::L1, 1)))
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_morphology);
criterion_main!(benches);
